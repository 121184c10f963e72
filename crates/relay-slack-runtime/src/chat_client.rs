//! Chat transport seam used by the channel publisher.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Identifies a posted chat message by channel and timestamp id.
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

#[derive(Debug, Error)]
/// Enumerates failures of a single chat API call.
pub enum PublishError {
    #[error("failed to create slack api client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("slack api {operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("slack api {operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to decode slack {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("slack {operation} failed: {error}")]
    Api {
        operation: &'static str,
        error: String,
    },
    #[error("slack {operation} response missing {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
    #[error("run message creation was already attempted and failed")]
    CreateAlreadyFailed,
}

/// Creates and edits chat messages on behalf of the publisher.
pub trait ChatClient: Send + Sync {
    fn post_message(&self, channel: &str, text: &str) -> Result<PostedMessage, PublishError>;

    fn update_message(
        &self,
        channel: &str,
        ts: &str,
        text: &str,
    ) -> Result<PostedMessage, PublishError>;
}
