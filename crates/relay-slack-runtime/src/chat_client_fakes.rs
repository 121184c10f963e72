//! In-memory `ChatClient` that records calls instead of reaching Slack.

use std::sync::Mutex;

use crate::chat_client::{ChatClient, PostedMessage, PublishError};

pub const RECORDED_MESSAGE_TS: &str = "1700000000.000100";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Post {
        channel: String,
        text: String,
    },
    Update {
        channel: String,
        ts: String,
        text: String,
    },
}

#[derive(Debug, Default)]
pub struct RecordingChatClient {
    calls: Mutex<Vec<RecordedCall>>,
    resolved_channel: Option<String>,
    fail_posts: bool,
    fail_updates: bool,
}

impl RecordingChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers posts with this channel id instead of echoing the request.
    pub fn with_resolved_channel(mut self, channel: impl Into<String>) -> Self {
        self.resolved_channel = Some(channel.into());
        self
    }

    pub fn failing_posts(mut self) -> Self {
        self.fail_posts = true;
        self
    }

    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, call: RecordedCall) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);
    }
}

impl ChatClient for RecordingChatClient {
    fn post_message(&self, channel: &str, text: &str) -> Result<PostedMessage, PublishError> {
        self.record(RecordedCall::Post {
            channel: channel.to_string(),
            text: text.to_string(),
        });
        if self.fail_posts {
            return Err(PublishError::Api {
                operation: "chat.postMessage",
                error: "channel_not_found".to_string(),
            });
        }
        Ok(PostedMessage {
            channel: self
                .resolved_channel
                .clone()
                .unwrap_or_else(|| channel.to_string()),
            ts: RECORDED_MESSAGE_TS.to_string(),
        })
    }

    fn update_message(
        &self,
        channel: &str,
        ts: &str,
        text: &str,
    ) -> Result<PostedMessage, PublishError> {
        self.record(RecordedCall::Update {
            channel: channel.to_string(),
            ts: ts.to_string(),
            text: text.to_string(),
        });
        if self.fail_updates {
            return Err(PublishError::Api {
                operation: "chat.update",
                error: "message_not_found".to_string(),
            });
        }
        Ok(PostedMessage {
            channel: channel.to_string(),
            ts: ts.to_string(),
        })
    }
}
