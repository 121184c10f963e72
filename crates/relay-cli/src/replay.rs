//! Feeds JSON-lines callback records into a run session.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use relay_core::CallbackRecord;
use relay_slack_runtime::RunSession;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReplayReport {
    pub(crate) events: usize,
    pub(crate) malformed: usize,
    pub(crate) publish_failures: usize,
}

/// Replays every record from `reader`. Malformed lines are logged and skipped;
/// only read failures on the input itself end the replay early.
pub(crate) fn replay_callbacks<R, W>(
    reader: R,
    session: &mut RunSession,
    mut echo: Option<&mut W>,
) -> Result<ReplayReport>
where
    R: BufRead,
    W: Write,
{
    let mut report = ReplayReport::default();
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("failed to read callback line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = match CallbackRecord::parse_line(&line) {
            Ok(record) => record,
            Err(error) => {
                report.malformed += 1;
                tracing::warn!(line = line_number, error = %format!("{error:#}"), "skipping malformed callback record");
                continue;
            }
        };

        let offset = session.log().current_text().len();
        let outcome = session.handle_callback(record);
        report.events += 1;
        if outcome.is_failure() {
            report.publish_failures += 1;
        }
        if let Some(out) = echo.as_mut() {
            let appended = &session.log().current_text()[offset..];
            if let Err(error) = out.write_all(appended.as_bytes()).and_then(|()| out.flush()) {
                tracing::warn!(%error, "failed to echo run log");
            }
        }
    }
    Ok(report)
}
