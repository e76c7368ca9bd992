//! Error types for the notifier library.

use thiserror::Error;

/// A release tag that is not a plain `major.minor.patch` version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}: {input:?}")]
pub struct ParseError {
    /// Why the input was rejected.
    pub reason: &'static str,
    /// The raw string as it was handed to the parser.
    pub input: String,
}

impl ParseError {
    pub(crate) fn malformed(input: &str) -> Self {
        Self {
            reason: "malformed version string",
            input: input.to_string(),
        }
    }
}

/// Failures talking to the release host or the chat service.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection, timeout, body decoding)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub API rate limit exceeded
    #[error("GitHub API rate limit exceeded")]
    RateLimitExceeded,

    /// GitHub answered with a non-success status
    #[error("GitHub API error ({status}): {message}")]
    GitHub { status: u16, message: String },

    /// Slack rejected the message
    #[error("Slack API error: {0}")]
    Slack(String),
}

/// Errors that abort a notification run.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// The triggering release's own tag is not a version.
    #[error("issue processing release: {0}")]
    Parse(#[from] ParseError),

    /// The release host or the chat service failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Convenience Result type for notifier operations.
pub type Result<T> = std::result::Result<T, NotifierError>;
