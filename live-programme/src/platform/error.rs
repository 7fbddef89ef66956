use std::time::Duration;

use thiserror::Error;

/// Failure reported by a platform adapter.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("channel not found")]
    NotFound,
    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },
    #[error("request timed out")]
    Timeout,
    #[error("unauthorized: check platform credentials")]
    Unauthorized,
    #[error("http error: {0}")]
    Http(reqwest::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("other: {0}")]
    Other(String),
}

impl PlatformError {
    /// The channel does not exist upstream; retrying will not help.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Transient failures worth retrying on the next poll.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout | Self::Http(_)
        )
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Http(err)
        }
    }
}

impl From<serde_json::Error> for PlatformError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
