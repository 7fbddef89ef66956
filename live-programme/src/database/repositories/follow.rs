//! Follow repository, the source of the global popularity ranking.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::Result;
use crate::database::models::StreamerRankingRow;
use crate::database::time::now_ms;

/// A streamer's position in the popularity ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamerRanking {
    pub streamer_id: String,
    pub follower_count: u64,
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Streamers ranked by follower count descending, then id ascending.
    async fn top_streamers(&self, limit: u32) -> Result<Vec<StreamerRanking>>;
    async fn follow(&self, user_id: &str, streamer_id: &str) -> Result<()>;
    async fn follower_count(&self, streamer_id: &str) -> Result<u64>;
}

pub struct SqlxFollowRepository {
    pool: SqlitePool,
}

impl SqlxFollowRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for SqlxFollowRepository {
    async fn top_streamers(&self, limit: u32) -> Result<Vec<StreamerRanking>> {
        let rows = sqlx::query_as::<_, StreamerRankingRow>(
            r#"
            SELECT s.id AS streamer_id, COUNT(f.user_id) AS follower_count
            FROM streamers s
            LEFT JOIN follows f ON f.streamer_id = s.id
            GROUP BY s.id
            ORDER BY follower_count DESC, s.id ASC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| StreamerRanking {
                streamer_id: row.streamer_id,
                follower_count: row.follower_count.max(0) as u64,
            })
            .collect())
    }

    async fn follow(&self, user_id: &str, streamer_id: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO follows (user_id, streamer_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(streamer_id)
        .bind(now_ms())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn follower_count(&self, streamer_id: &str) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows WHERE streamer_id = ?")
            .bind(streamer_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}
