//! Streamer repository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::database::models::StreamerDbModel;
use crate::domain::Streamer;
use crate::{Error, Result};

/// Streamer directory.
#[async_trait]
pub trait StreamerRepository: Send + Sync {
    /// List up to `limit` streamers ordered by id.
    async fn list(&self, limit: u32) -> Result<Vec<Streamer>>;
    async fn get(&self, id: &str) -> Result<Streamer>;
    async fn create(&self, streamer: &Streamer) -> Result<()>;
    async fn update(&self, streamer: &Streamer) -> Result<()>;
}

/// SQLx implementation of StreamerRepository.
pub struct SqlxStreamerRepository {
    pool: SqlitePool,
}

impl SqlxStreamerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StreamerRepository for SqlxStreamerRepository {
    async fn list(&self, limit: u32) -> Result<Vec<Streamer>> {
        let rows = sqlx::query_as::<_, StreamerDbModel>(
            "SELECT * FROM streamers ORDER BY id LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StreamerDbModel::into_domain).collect()
    }

    async fn get(&self, id: &str) -> Result<Streamer> {
        sqlx::query_as::<_, StreamerDbModel>("SELECT * FROM streamers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("Streamer", id))?
            .into_domain()
    }

    async fn create(&self, streamer: &Streamer) -> Result<()> {
        let model = StreamerDbModel::from_domain(streamer)?;
        sqlx::query(
            r#"
            INSERT INTO streamers (id, name, handles, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&model.id)
        .bind(&model.name)
        .bind(&model.handles)
        .bind(model.created_at)
        .bind(model.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, streamer: &Streamer) -> Result<()> {
        let model = StreamerDbModel::from_domain(streamer)?;
        let result = sqlx::query(
            "UPDATE streamers SET name = ?, handles = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&model.name)
        .bind(&model.handles)
        .bind(model.updated_at)
        .bind(&model.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Streamer", &streamer.id));
        }
        Ok(())
    }
}
