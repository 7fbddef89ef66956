//! Custom programme repository: user-curated streamer sets.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::Result;

#[async_trait]
pub trait CustomProgrammeRepository: Send + Sync {
    /// Streamer ids in the user's custom programme, in saved order.
    /// Empty when the user has none.
    async fn get(&self, user_id: &str) -> Result<Vec<String>>;
    /// Replace the user's custom programme.
    async fn set(&self, user_id: &str, streamer_ids: &[String]) -> Result<()>;
    async fn clear(&self, user_id: &str) -> Result<()>;
}

pub struct SqlxCustomProgrammeRepository {
    pool: SqlitePool,
}

impl SqlxCustomProgrammeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomProgrammeRepository for SqlxCustomProgrammeRepository {
    async fn get(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT streamer_id FROM custom_programmes WHERE user_id = ? ORDER BY position",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn set(&self, user_id: &str, streamer_ids: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM custom_programmes WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for (position, streamer_id) in streamer_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO custom_programmes (user_id, streamer_id, position) VALUES (?, ?, ?)",
            )
            .bind(user_id)
            .bind(streamer_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM custom_programmes WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
