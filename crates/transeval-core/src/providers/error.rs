//! Error types for provider calls.

use std::time::Duration;

/// Provider errors.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Transport failure (connect, TLS, timeout, body read).
    #[error("network error: {message}")]
    Network { message: String },

    /// Non-success HTTP status.
    #[error("{provider} API error (status {status}): {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// HTTP 429.
    #[error("rate limited: retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Reply arrived but did not have the expected shape.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },
}

impl ProviderError {
    /// Whether the error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::InvalidResponse { .. } => false,
        }
    }
}

/// The request URL is stripped from the message.
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.without_url().to_string(),
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
