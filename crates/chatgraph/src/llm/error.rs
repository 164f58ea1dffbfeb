//! LLM call errors.

use thiserror::Error;

/// Errors from a model call; surfaced to the caller without retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    /// Provider returned an error (5xx or an unexpected status).
    #[error("api error: {0}")]
    Api(String),

    /// Rate limited (429).
    #[error("rate limit: {0}")]
    RateLimit(String),

    /// Authentication failed (401/403) or no API key configured.
    #[error("auth failed: {0}")]
    Auth(String),

    /// Request rejected as invalid (other 4xx), or bad client configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be parsed.
    #[error("parsing failed: {0}")]
    Parsing(String),
}

impl LlmError {
    /// Maps a non-success HTTP status and its body to an error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => LlmError::Auth(body),
            429 => LlmError::RateLimit(body),
            400..=499 => LlmError::InvalidRequest(body),
            _ => LlmError::Api(body),
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Network(e.to_string())
    }
}
