//! Keeps one chat message in sync with the run log.
//!
//! The first publish of a run creates the message and remembers its handle;
//! every later publish edits that same message with the full log. The handle
//! is set at most once and never rewritten by update responses.

use std::sync::Arc;

use relay_core::RunEvent;

use crate::chat_client::{ChatClient, PostedMessage, PublishError};
use crate::slack_helpers::render_message_body;

pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 38_000;
/// Smallest body that still fits both code fences, the `...` marker and text.
pub const MIN_MESSAGE_CHARS: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Selects which event creates the run's chat message.
pub enum PublishTrigger {
    /// The first event of any kind.
    #[default]
    FirstEvent,
    /// The first play start; earlier events are logged but not published.
    PlayStart,
}

impl PublishTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstEvent => "first-event",
            Self::PlayStart => "play-start",
        }
    }

    pub fn fires_on(self, event: &RunEvent) -> bool {
        match self {
            Self::FirstEvent => true,
            Self::PlayStart => event.is_play_start(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    pub channel: String,
    pub trigger: PublishTrigger,
    pub max_message_chars: usize,
}

impl PublisherConfig {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            trigger: PublishTrigger::default(),
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
        }
    }
}

pub struct ChannelPublisher {
    client: Arc<dyn ChatClient>,
    config: PublisherConfig,
    message: Option<PostedMessage>,
    create_attempted: bool,
}

impl ChannelPublisher {
    pub fn new(client: Arc<dyn ChatClient>, config: PublisherConfig) -> Self {
        Self {
            client,
            config,
            message: None,
            create_attempted: false,
        }
    }

    pub fn trigger(&self) -> PublishTrigger {
        self.config.trigger
    }

    pub fn create_attempted(&self) -> bool {
        self.create_attempted
    }

    pub fn published_message(&self) -> Option<&PostedMessage> {
        self.message.as_ref()
    }

    /// Creates the run's message. Once a create was attempted no further create
    /// call is made: the stored handle is returned, or `CreateAlreadyFailed`.
    pub fn publish_initial(&mut self, log_text: &str) -> Result<PostedMessage, PublishError> {
        if let Some(message) = self.message.as_ref() {
            return Ok(message.clone());
        }
        if self.create_attempted {
            return Err(PublishError::CreateAlreadyFailed);
        }
        self.create_attempted = true;
        let body = render_message_body(log_text, self.config.max_message_chars);
        let posted = self.client.post_message(&self.config.channel, &body)?;
        self.message = Some(posted.clone());
        Ok(posted)
    }

    /// Replaces the message body. Returns `Ok(None)` without a remote call when
    /// no message was created.
    pub fn publish_update(
        &mut self,
        log_text: &str,
    ) -> Result<Option<PostedMessage>, PublishError> {
        let Some(message) = self.message.as_ref() else {
            return Ok(None);
        };
        let body = render_message_body(log_text, self.config.max_message_chars);
        self.client
            .update_message(&message.channel, &message.ts, &body)?;
        Ok(Some(message.clone()))
    }
}
