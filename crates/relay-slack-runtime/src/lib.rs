//! Slack publishing runtime for relay run logs.
//!
//! Wires the run-log primitives from `relay-core` to a single Slack message
//! that is created once per run and edited in place afterwards. Publishing is
//! best effort: failures are reported as values and logged, never raised to
//! the automation runner.

pub mod channel_publisher;
pub mod chat_client;
pub mod chat_client_fakes;
pub mod run_session;
pub mod slack_api_client;
mod slack_helpers;

pub use channel_publisher::{
    ChannelPublisher, PublishTrigger, PublisherConfig, DEFAULT_MAX_MESSAGE_CHARS,
    MIN_MESSAGE_CHARS,
};
pub use chat_client::{ChatClient, PostedMessage, PublishError};
pub use chat_client_fakes::{RecordedCall, RecordingChatClient, RECORDED_MESSAGE_TS};
pub use run_session::{PublishOutcome, RunSession};
pub use slack_api_client::{
    SlackApiClient, SlackClientConfig, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SLACK_API_BASE,
};
