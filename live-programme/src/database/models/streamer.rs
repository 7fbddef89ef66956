//! Streamer database model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::Result;
use crate::database::time::now_ms;
use crate::domain::Streamer;

/// Streamer row. `handles` holds a JSON object of platform -> handle.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StreamerDbModel {
    pub id: String,
    pub name: String,
    pub handles: String,
    /// Unix epoch milliseconds (UTC) when created.
    pub created_at: i64,
    /// Unix epoch milliseconds (UTC) when last updated.
    pub updated_at: i64,
}

impl StreamerDbModel {
    pub fn from_domain(streamer: &Streamer) -> Result<Self> {
        let now = now_ms();
        Ok(Self {
            id: streamer.id.clone(),
            name: streamer.name.clone(),
            handles: serde_json::to_string(&streamer.handles)?,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn into_domain(self) -> Result<Streamer> {
        let handles: BTreeMap<String, String> = serde_json::from_str(&self.handles)?;
        Ok(Streamer {
            id: self.id,
            name: self.name,
            handles,
        })
    }
}

/// Streamer id with its follower count, as produced by the ranking query.
#[derive(Debug, Clone, FromRow)]
pub struct StreamerRankingRow {
    pub streamer_id: String,
    pub follower_count: i64,
}
