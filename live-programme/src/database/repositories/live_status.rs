//! Persisted live status store, used as a fallback when platforms fail.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::LiveStatusDbModel;
use crate::live_status::LiveStatus;

#[async_trait]
pub trait LiveStatusRepository: Send + Sync {
    /// Last persisted status, marked stale.
    async fn get(&self, streamer_id: &str) -> Result<Option<LiveStatus>>;
    async fn upsert(&self, status: &LiveStatus) -> Result<()>;
}

pub struct SqlxLiveStatusRepository {
    pool: SqlitePool,
}

impl SqlxLiveStatusRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LiveStatusRepository for SqlxLiveStatusRepository {
    async fn get(&self, streamer_id: &str) -> Result<Option<LiveStatus>> {
        let row = sqlx::query_as::<_, LiveStatusDbModel>(
            "SELECT * FROM live_status WHERE streamer_id = ?",
        )
        .bind(streamer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(LiveStatus::from))
    }

    async fn upsert(&self, status: &LiveStatus) -> Result<()> {
        let model = LiveStatusDbModel::from(status);
        sqlx::query(
            r#"
            INSERT INTO live_status (streamer_id, is_live, platform, title, stream_url, viewer_count, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(streamer_id) DO UPDATE SET
                is_live = excluded.is_live,
                platform = excluded.platform,
                title = excluded.title,
                stream_url = excluded.stream_url,
                viewer_count = excluded.viewer_count,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&model.streamer_id)
        .bind(model.is_live)
        .bind(&model.platform)
        .bind(&model.title)
        .bind(&model.stream_url)
        .bind(model.viewer_count)
        .bind(model.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
