//! Per-run context that owns the log and the publisher.
//!
//! The runner calls one hook per lifecycle event. Each hook renders the event,
//! appends it to the run log and pushes the full log to chat. Publish failures
//! are logged here and returned as `PublishOutcome::Failed`; they never reach
//! the runner as errors.

use relay_core::{
    render_event_lines, CallbackRecord, HostStats, RunEvent, RunLog, UnreachableResult,
};
use serde_json::{Map, Value};

use crate::channel_publisher::ChannelPublisher;
use crate::chat_client::PostedMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of pushing the log after one event.
pub enum PublishOutcome {
    /// The run's message was created.
    Created,
    /// The run's message was edited in place.
    Updated,
    /// The configured trigger has not fired yet; nothing was sent.
    Deferred,
    /// Creation was attempted earlier but produced no message; nothing was sent.
    Skipped,
    Failed { reason: String },
}

impl PublishOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deferred => "deferred",
            Self::Skipped => "skipped",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

pub struct RunSession {
    log: RunLog,
    publisher: ChannelPublisher,
}

impl RunSession {
    pub fn new(publisher: ChannelPublisher) -> Self {
        Self {
            log: RunLog::new(),
            publisher,
        }
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    pub fn published_message(&self) -> Option<&PostedMessage> {
        self.publisher.published_message()
    }

    pub fn handle_callback(&mut self, record: CallbackRecord) -> PublishOutcome {
        self.handle(&RunEvent::from(record))
    }

    pub fn handle(&mut self, event: &RunEvent) -> PublishOutcome {
        for line in render_event_lines(event) {
            self.log.append(&line);
        }
        let outcome = self.dispatch(event);
        match &outcome {
            PublishOutcome::Failed { reason } => {
                tracing::warn!(event = event.kind(), %reason, "run log publish failed");
            }
            other => {
                tracing::debug!(
                    event = event.kind(),
                    outcome = other.as_str(),
                    entries = self.log.entry_count(),
                    "run log published"
                );
            }
        }
        outcome
    }

    fn dispatch(&mut self, event: &RunEvent) -> PublishOutcome {
        let log_text = self.log.current_text();
        if !self.publisher.create_attempted() {
            if !self.publisher.trigger().fires_on(event) {
                return PublishOutcome::Deferred;
            }
            return match self.publisher.publish_initial(log_text) {
                Ok(_) => PublishOutcome::Created,
                Err(error) => PublishOutcome::Failed {
                    reason: error.to_string(),
                },
            };
        }
        match self.publisher.publish_update(log_text) {
            Ok(Some(_)) => PublishOutcome::Updated,
            Ok(None) => PublishOutcome::Skipped,
            Err(error) => PublishOutcome::Failed {
                reason: error.to_string(),
            },
        }
    }

    pub fn on_task_start(&mut self, name: &str, is_conditional: bool) -> PublishOutcome {
        self.handle(&RunEvent::TaskStart {
            name: name.to_string(),
            is_conditional,
        })
    }

    pub fn on_setup(&mut self) -> PublishOutcome {
        self.handle(&RunEvent::Setup)
    }

    pub fn on_play_start(&mut self, name: &str) -> PublishOutcome {
        self.handle(&RunEvent::PlayStart {
            name: name.to_string(),
        })
    }

    pub fn on_host_ok(&mut self, host: &str, item: Option<&str>, changed: bool) -> PublishOutcome {
        self.handle(&RunEvent::HostOk {
            host: host.to_string(),
            item: item.map(str::to_string),
            changed,
        })
    }

    /// Takes the raw result map; `invocation` is dropped before rendering.
    pub fn on_host_failed(&mut self, host: &str, result: Map<String, Value>) -> PublishOutcome {
        self.handle_callback(CallbackRecord::HostFailed {
            host: host.to_string(),
            result: Value::Object(result),
            ignore_errors: false,
        })
    }

    pub fn on_host_skipped(&mut self, host: &str, item: Option<&str>) -> PublishOutcome {
        self.handle(&RunEvent::HostSkipped {
            host: host.to_string(),
            item: item.map(str::to_string),
        })
    }

    pub fn on_host_unreachable(&mut self, host: &str, result: Value) -> PublishOutcome {
        self.handle_callback(CallbackRecord::HostUnreachable {
            host: host.to_string(),
            result,
        })
    }

    pub fn on_host_unreachable_text(&mut self, host: &str, message: &str) -> PublishOutcome {
        self.handle(&RunEvent::HostUnreachable {
            host: host.to_string(),
            item: None,
            result: UnreachableResult::Text(message.to_string()),
        })
    }

    pub fn on_no_hosts(&mut self) -> PublishOutcome {
        self.handle(&RunEvent::NoHosts)
    }

    pub fn on_stats(&mut self, hosts: Vec<HostStats>) -> PublishOutcome {
        self.handle(&RunEvent::Stats { hosts })
    }
}
