//! Activity records: point-in-time markers of a detected go-live.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One detected offline → live transition.
///
/// `start_time` and `end_time` are equal: the record marks the instant a
/// broadcast was first observed, not its duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: String,
    pub streamer_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub platform: String,
    pub created_at: DateTime<Utc>,
}

impl ActivityRecord {
    /// Build the marker for a streamer observed live on `platform` at `at`.
    ///
    /// Both the tracker and manual backfill go through this constructor.
    pub fn live_marker(
        streamer_id: impl Into<String>,
        platform: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            streamer_id: streamer_id.into(),
            start_time: at,
            end_time: at,
            platform: platform.into(),
            created_at: Utc::now(),
        }
    }
}
