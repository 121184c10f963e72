//! Slack Web API client for the two message operations the relay needs.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::chat_client::{ChatClient, PostedMessage, PublishError};
use crate::slack_helpers::truncate_for_error;

pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

const POST_MESSAGE_OPERATION: &str = "chat.postMessage";
const UPDATE_MESSAGE_OPERATION: &str = "chat.update";

#[derive(Debug, Clone, Deserialize)]
struct SlackChatMessageResponse {
    ok: bool,
    ts: Option<String>,
    channel: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Connection settings for `SlackApiClient`.
pub struct SlackClientConfig {
    pub api_base: String,
    pub token: String,
    pub request_timeout_ms: u64,
}

impl Default for SlackClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_SLACK_API_BASE.to_string(),
            token: String::new(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

#[derive(Clone)]
/// Blocking Slack client. Each call is a single attempt with no retry.
pub struct SlackApiClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

impl SlackApiClient {
    pub fn new(config: SlackClientConfig) -> Result<Self, PublishError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("relay-slack-runtime"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .map_err(PublishError::ClientBuild)?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.trim().to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn request_message(
        &self,
        operation: &'static str,
        payload: &Value,
    ) -> Result<SlackChatMessageResponse, PublishError> {
        let response = self
            .http
            .post(format!("{}/{operation}", self.api_base))
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .map_err(|source| PublishError::Transport { operation, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PublishError::Status {
                operation,
                status: status.as_u16(),
                body: truncate_for_error(&body, 800),
            });
        }

        let parsed = response
            .json::<SlackChatMessageResponse>()
            .map_err(|source| PublishError::Decode { operation, source })?;
        if !parsed.ok {
            return Err(PublishError::Api {
                operation,
                error: parsed
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        Ok(parsed)
    }
}

impl ChatClient for SlackApiClient {
    fn post_message(&self, channel: &str, text: &str) -> Result<PostedMessage, PublishError> {
        let payload = json!({
            "channel": channel,
            "text": text,
            "as_user": true,
        });
        let response = self.request_message(POST_MESSAGE_OPERATION, &payload)?;
        let ts = response
            .ts
            .filter(|value| !value.trim().is_empty())
            .ok_or(PublishError::MissingField {
                operation: POST_MESSAGE_OPERATION,
                field: "ts",
            })?;
        Ok(PostedMessage {
            channel: response.channel.unwrap_or_else(|| channel.to_string()),
            ts,
        })
    }

    fn update_message(
        &self,
        channel: &str,
        ts: &str,
        text: &str,
    ) -> Result<PostedMessage, PublishError> {
        let payload = json!({
            "channel": channel,
            "ts": ts,
            "text": text,
        });
        let response = self.request_message(UPDATE_MESSAGE_OPERATION, &payload)?;
        Ok(PostedMessage {
            channel: response.channel.unwrap_or_else(|| channel.to_string()),
            ts: response.ts.unwrap_or_else(|| ts.to_string()),
        })
    }
}
