//! Persisted live status (fallback copy).

use sqlx::FromRow;

use crate::database::time::{datetime_to_ms, ms_to_datetime};
use crate::live_status::{LiveStatus, StatusFreshness};

#[derive(Debug, Clone, FromRow)]
pub struct LiveStatusDbModel {
    pub streamer_id: String,
    pub is_live: bool,
    pub platform: Option<String>,
    pub title: Option<String>,
    pub stream_url: Option<String>,
    pub viewer_count: Option<i64>,
    pub updated_at: i64,
}

impl From<&LiveStatus> for LiveStatusDbModel {
    fn from(status: &LiveStatus) -> Self {
        Self {
            streamer_id: status.streamer_id.clone(),
            is_live: status.is_live,
            platform: status.platform.clone(),
            title: status.title.clone(),
            stream_url: status.stream_url.clone(),
            viewer_count: status.viewer_count.map(|v| v.min(i64::MAX as u64) as i64),
            updated_at: datetime_to_ms(status.updated_at),
        }
    }
}

impl From<LiveStatusDbModel> for LiveStatus {
    /// Persisted values are only ever served as a fallback.
    fn from(model: LiveStatusDbModel) -> Self {
        Self {
            streamer_id: model.streamer_id,
            is_live: model.is_live,
            platform: model.platform,
            title: model.title,
            stream_url: model.stream_url,
            viewer_count: model.viewer_count.map(|v| v.max(0) as u64),
            updated_at: ms_to_datetime(model.updated_at),
            freshness: StatusFreshness::Stale,
        }
    }
}
