//! Live status value returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::PlatformLiveStatus;

/// How a [`LiveStatus`] was obtained.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatusFreshness {
    /// Just fetched from the platform.
    Fresh,
    /// Served from the cache within its TTL.
    Cached,
    /// The platform call failed; this is the last persisted value.
    Stale,
    /// The platform call failed and nothing was known before.
    #[default]
    Unknown,
}

impl StatusFreshness {
    /// Whether the value reflects a successful platform call.
    pub fn is_current(&self) -> bool {
        matches!(self, Self::Fresh | Self::Cached)
    }
}

/// Whether a streamer is live right now, and on which platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStatus {
    pub streamer_id: String,
    pub is_live: bool,
    /// Reporting platform; `None` only for unknown statuses.
    pub platform: Option<String>,
    pub title: Option<String>,
    pub stream_url: Option<String>,
    pub viewer_count: Option<u64>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub freshness: StatusFreshness,
}

impl LiveStatus {
    /// Build a fresh status from a platform answer.
    pub fn from_platform(
        streamer_id: impl Into<String>,
        platform: impl Into<String>,
        status: PlatformLiveStatus,
    ) -> Self {
        Self {
            streamer_id: streamer_id.into(),
            is_live: status.is_live,
            platform: Some(platform.into()),
            title: status.title,
            stream_url: status.stream_url,
            viewer_count: status.viewer_count,
            updated_at: Utc::now(),
            freshness: StatusFreshness::Fresh,
        }
    }

    /// "Status unknown": no platform answer and no prior value.
    pub fn unknown(streamer_id: impl Into<String>) -> Self {
        Self {
            streamer_id: streamer_id.into(),
            is_live: false,
            platform: None,
            title: None,
            stream_url: None,
            viewer_count: None,
            updated_at: Utc::now(),
            freshness: StatusFreshness::Unknown,
        }
    }

    pub fn with_freshness(mut self, freshness: StatusFreshness) -> Self {
        self.freshness = freshness;
        self
    }

    /// Whether this value is served in place of a failed platform call.
    pub fn is_degraded(&self) -> bool {
        !self.freshness.is_current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_platform_is_fresh() {
        let status = LiveStatus::from_platform("s1", "twitch", PlatformLiveStatus::live("hello"));
        assert!(status.is_live);
        assert_eq!(status.platform.as_deref(), Some("twitch"));
        assert_eq!(status.freshness, StatusFreshness::Fresh);
        assert!(!status.is_degraded());
    }

    #[test]
    fn test_unknown_is_degraded() {
        let status = LiveStatus::unknown("s1");
        assert!(!status.is_live);
        assert!(status.platform.is_none());
        assert!(status.is_degraded());
        assert_eq!(status.freshness.to_string(), "unknown");
    }

    #[test]
    fn test_freshness_deserializes_with_default() {
        let json = r#"{
            "streamer_id": "s1",
            "is_live": true,
            "platform": "twitch",
            "title": null,
            "stream_url": null,
            "viewer_count": 3,
            "updated_at": "2024-03-04T14:00:00Z"
        }"#;
        let status: LiveStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.freshness, StatusFreshness::Unknown);
        assert_eq!(status.viewer_count, Some(3));
    }
}
