use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use relay_slack_runtime::{
    PublishTrigger, PublisherConfig, SlackClientConfig, DEFAULT_MAX_MESSAGE_CHARS,
    DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SLACK_API_BASE, MIN_MESSAGE_CHARS,
};

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_message_chars(value: &str) -> Result<usize, String> {
    let parsed = parse_positive_usize(value)?;
    if parsed < MIN_MESSAGE_CHARS {
        return Err(format!("value must be at least {MIN_MESSAGE_CHARS}"));
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliPublishTrigger {
    FirstEvent,
    PlayStart,
}

impl From<CliPublishTrigger> for PublishTrigger {
    fn from(value: CliPublishTrigger) -> Self {
        match value {
            CliPublishTrigger::FirstEvent => PublishTrigger::FirstEvent,
            CliPublishTrigger::PlayStart => PublishTrigger::PlayStart,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "relay",
    about = "Mirror automation run callbacks into a single, continuously edited Slack message",
    version
)]
pub struct Cli {
    #[arg(
        long = "slack-token",
        env = "SLACK_TOKEN",
        hide_env_values = true,
        help = "Slack bot token used for chat.postMessage and chat.update. When unset, publishing fails quietly and only the local log is kept."
    )]
    pub slack_token: Option<String>,

    #[arg(
        long = "slack-channel",
        env = "SLACK_CHANNEL",
        help = "Destination channel id or name for the run message."
    )]
    pub slack_channel: Option<String>,

    #[arg(
        long = "slack-api-base",
        env = "SLACK_API_BASE",
        default_value = DEFAULT_SLACK_API_BASE,
        help = "Base URL of the Slack Web API."
    )]
    pub slack_api_base: String,

    #[arg(
        long = "request-timeout-ms",
        env = "RELAY_REQUEST_TIMEOUT_MS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_MS,
        value_parser = parse_positive_u64,
        help = "Timeout for each Slack API request in milliseconds."
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "publish-trigger",
        env = "RELAY_PUBLISH_TRIGGER",
        value_enum,
        default_value_t = CliPublishTrigger::FirstEvent,
        help = "Event that creates the run message. play-start keeps earlier events local until the first play begins."
    )]
    pub publish_trigger: CliPublishTrigger,

    #[arg(
        long = "max-message-chars",
        env = "RELAY_MAX_MESSAGE_CHARS",
        default_value_t = DEFAULT_MAX_MESSAGE_CHARS,
        value_parser = parse_message_chars,
        help = "Upper bound for the published message body. Older log lines are dropped from the message, never from the log."
    )]
    pub max_message_chars: usize,

    #[arg(
        long = "events-file",
        help = "Read callback records from this JSON-lines file instead of stdin."
    )]
    pub events_file: Option<PathBuf>,

    #[arg(
        long,
        default_value_t = false,
        help = "Also print each appended log block to stdout."
    )]
    pub echo: bool,
}

impl Cli {
    pub fn slack_client_config(&self) -> SlackClientConfig {
        SlackClientConfig {
            api_base: self.slack_api_base.clone(),
            token: self.slack_token.clone().unwrap_or_default(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }

    pub fn publisher_config(&self) -> PublisherConfig {
        PublisherConfig {
            channel: self.slack_channel.clone().unwrap_or_default(),
            trigger: self.publish_trigger.into(),
            max_message_chars: self.max_message_chars,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use relay_slack_runtime::PublishTrigger;

    use super::{Cli, CliPublishTrigger};

    #[test]
    fn unit_explicit_flags_map_into_runtime_configs() {
        let cli = Cli::try_parse_from([
            "relay",
            "--slack-token",
            "xoxb-cli",
            "--slack-channel",
            "C42",
            "--slack-api-base",
            "http://127.0.0.1:8080/api",
            "--request-timeout-ms",
            "250",
            "--publish-trigger",
            "play-start",
            "--max-message-chars",
            "4000",
            "--events-file",
            "run.jsonl",
            "--echo",
        ])
        .expect("parse");

        assert_eq!(cli.publish_trigger, CliPublishTrigger::PlayStart);
        assert_eq!(cli.events_file, Some(PathBuf::from("run.jsonl")));
        assert!(cli.echo);

        let client = cli.slack_client_config();
        assert_eq!(client.api_base, "http://127.0.0.1:8080/api");
        assert_eq!(client.token, "xoxb-cli");
        assert_eq!(client.request_timeout_ms, 250);

        let publisher = cli.publisher_config();
        assert_eq!(publisher.channel, "C42");
        assert_eq!(publisher.trigger, PublishTrigger::PlayStart);
        assert_eq!(publisher.max_message_chars, 4_000);
    }

    #[test]
    fn regression_zero_limits_are_rejected() {
        let error = Cli::try_parse_from(["relay", "--request-timeout-ms", "0"])
            .expect_err("zero timeout must fail");
        assert!(error.to_string().contains("value must be greater than 0"));

        let error = Cli::try_parse_from(["relay", "--max-message-chars", "0"])
            .expect_err("zero max chars must fail");
        assert!(error.to_string().contains("value must be greater than 0"));
    }

    #[test]
    fn regression_max_message_chars_below_minimum_is_rejected() {
        let error = Cli::try_parse_from(["relay", "--max-message-chars", "8"])
            .expect_err("tiny limit must fail");
        assert!(error.to_string().contains("value must be at least 16"));

        let cli = Cli::try_parse_from(["relay", "--max-message-chars", "16"]).expect("parse");
        assert_eq!(cli.max_message_chars, 16);
    }

    #[test]
    fn regression_unknown_publish_trigger_is_rejected() {
        let error = Cli::try_parse_from(["relay", "--publish-trigger", "stats"])
            .expect_err("unknown trigger must fail");
        assert!(error.to_string().contains("invalid value"));
    }
}
