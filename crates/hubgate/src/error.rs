//! Error types for the hubgate SDK.
//!
//! One `thiserror` enum covers the whole taxonomy: token exchange, transport,
//! status, protocol and lifecycle failures. Every error carries enough
//! context (status code, truncated body) for a caller to log without
//! re-parsing anything.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for operations that can fail with a hubgate error.
pub type Result<T> = std::result::Result<T, Error>;

/// How many bytes of a response body to show in error displays.
const BODY_PREVIEW_LEN: usize = 200;

/// Main error type for the hubgate SDK.
#[derive(Debug, Error)]
pub enum Error {
    /// Token exchange failed after retries, or the token response was
    /// malformed (not JSON, or missing `access_token`).
    #[error("token exchange failed: {0}")]
    Auth(String),

    /// Connection-level failure: refused, reset, DNS, TLS.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request did not complete within the configured total timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// A domain endpoint returned a non-2xx status.
    #[error("gateway returned status {status}: {}", preview(.body))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Full response body text.
        body: String,
    },

    /// A response body was not valid JSON where the caller expected JSON.
    #[error("response was not valid JSON: {0}")]
    Protocol(#[from] serde_json::Error),

    /// Operation attempted after the client was explicitly closed.
    #[error("client is closed")]
    Closed,

    /// The base URL or a composed request URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid HTTP header name.
    #[error("invalid HTTP header name: {0}")]
    InvalidHeaderName(String),

    /// Invalid HTTP header value.
    #[error("invalid HTTP header value: {0}")]
    InvalidHeaderValue(String),

    /// A blocking entry point was used from inside an async runtime.
    #[error("blocking call attempted from within an async runtime")]
    RuntimeContext,

    /// Required configuration was absent.
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Generic I/O error (runtime construction, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the retry layer may re-attempt the operation.
    ///
    /// Only transport-level failures and 5xx statuses qualify; everything
    /// else (4xx, auth, closed, protocol) fails immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) | Error::Timeout(_) => true,
            Error::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Status code, if this error came from an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub(crate) fn preview(body: &str) -> &str {
    truncate_utf8(body, BODY_PREVIEW_LEN)
}

/// Truncate to at most `max` bytes without splitting a multi-byte character.
pub(crate) fn truncate_utf8(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
