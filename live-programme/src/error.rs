//! Application-wide error types.

use thiserror::Error;

use crate::platform::PlatformError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
///
/// Degraded-but-successful outcomes (a stale live status, a heatmap with no
/// data points) are not represented here; they are states of the returned
/// values.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Upstream {platform} unavailable: {message}")]
    UpstreamUnavailable { platform: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn upstream(platform: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            platform: platform.into(),
            message: message.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this error reports a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Convert an adapter failure for `handle` on `platform`.
    pub fn from_platform(platform: &str, handle: &str, err: PlatformError) -> Self {
        if err.is_not_found() {
            Self::not_found(format!("{platform} channel"), handle)
        } else {
            Self::upstream(platform, err.to_string())
        }
    }
}
