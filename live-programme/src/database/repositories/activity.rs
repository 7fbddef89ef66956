//! Activity record repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::ActivityRecordDbModel;
use crate::database::time::datetime_to_ms;
use crate::domain::ActivityRecord;

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn create(&self, record: &ActivityRecord) -> Result<()>;

    /// Records for a streamer with `start_time >= since` (all when `None`),
    /// ordered by start time.
    async fn get_by_streamer_id(
        &self,
        streamer_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActivityRecord>>;
}

pub struct SqlxActivityRepository {
    pool: SqlitePool,
}

impl SqlxActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityRepository for SqlxActivityRepository {
    async fn create(&self, record: &ActivityRecord) -> Result<()> {
        let model = ActivityRecordDbModel::from(record);
        sqlx::query(
            r#"
            INSERT INTO activity_records (id, streamer_id, start_time, end_time, platform, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&model.id)
        .bind(&model.streamer_id)
        .bind(model.start_time)
        .bind(model.end_time)
        .bind(&model.platform)
        .bind(model.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_by_streamer_id(
        &self,
        streamer_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActivityRecord>> {
        let since_ms = since.map(datetime_to_ms).unwrap_or(i64::MIN);
        let rows = sqlx::query_as::<_, ActivityRecordDbModel>(
            r#"
            SELECT * FROM activity_records
            WHERE streamer_id = ? AND start_time >= ?
            ORDER BY start_time, id
            "#,
        )
        .bind(streamer_id)
        .bind(since_ms)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ActivityRecord::from).collect())
    }
}
