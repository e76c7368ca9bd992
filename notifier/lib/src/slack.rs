//! Slack `chat.postMessage` delivery.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::TransportError;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Base URL of the Slack Web API.
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api/";

/// Destination for a composed notification.
pub trait ChatDelivery {
    /// Delivers `message` as-is.
    fn deliver(&self, message: &str) -> impl Future<Output = Result<(), TransportError>>;
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    mrkdwn: bool,
}

/// Slack answers HTTP 200 for most failures and reports them in the body.
#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts messages to one Slack channel with a bot token.
#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    api_url: String,
    token: String,
    channel: String,
    timeout: Duration,
}

impl SlackClient {
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            channel: channel.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackClient")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("channel", &self.channel)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ChatDelivery for SlackClient {
    #[tracing::instrument(skip_all, fields(channel = %self.channel))]
    async fn deliver(&self, message: &str) -> Result<(), TransportError> {
        let url = format!("{}/chat.postMessage", self.api_url);
        let body = PostMessage {
            channel: &self.channel,
            text: message,
            mrkdwn: true,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(TransportError::Slack(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let reply: SlackResponse = response.json().await?;
        if !reply.ok {
            return Err(TransportError::Slack(
                reply.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        info!("notification delivered");
        Ok(())
    }
}
