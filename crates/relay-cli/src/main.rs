//! `relay` binary: replays automation run callbacks into a Slack message.

mod bootstrap_helpers;
mod cli_args;
mod replay;

use std::fs::File;
use std::io::{self, BufReader};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use relay_slack_runtime::{ChannelPublisher, RunSession, SlackApiClient};

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;
use crate::replay::{replay_callbacks, ReplayReport};

fn build_run_session(cli: &Cli) -> Result<RunSession> {
    if cli.slack_token.as_deref().map_or(true, |token| token.trim().is_empty()) {
        tracing::warn!("SLACK_TOKEN is not set; run log will not be published");
    }
    if cli.slack_channel.as_deref().map_or(true, |channel| channel.trim().is_empty()) {
        tracing::warn!("SLACK_CHANNEL is not set; run log will not be published");
    }
    let client = SlackApiClient::new(cli.slack_client_config())
        .context("failed to initialize slack client")?;
    let publisher_config = cli.publisher_config();
    tracing::debug!(
        api_base = client.api_base(),
        channel = %publisher_config.channel,
        trigger = publisher_config.trigger.as_str(),
        max_message_chars = publisher_config.max_message_chars,
        "run relay configured"
    );
    let publisher = ChannelPublisher::new(Arc::new(client), publisher_config);
    Ok(RunSession::new(publisher))
}

fn run(cli: &Cli, session: &mut RunSession) -> Result<ReplayReport> {
    let mut stdout = io::stdout();
    let echo = cli.echo.then_some(&mut stdout);
    match &cli.events_file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open events file {}", path.display()))?;
            replay_callbacks(BufReader::new(file), session, echo)
        }
        None => replay_callbacks(io::stdin().lock(), session, echo),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut session = build_run_session(&cli)?;
    let report = run(&cli, &mut session)?;
    tracing::info!(
        events = report.events,
        malformed = report.malformed,
        publish_failures = report.publish_failures,
        published = session.published_message().is_some(),
        "run relay finished"
    );
    Ok(())
}
