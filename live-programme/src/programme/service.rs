//! Programme service.
//!
//! Resolves the streamer set for an audience (a user's custom selection,
//! or the most-followed streamers) and lays their heatmaps out as a
//! weekly calendar.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::database::repositories::{
    CustomProgrammeRepository, FollowRepository, StreamerRepository,
};
use crate::heatmap::HeatmapService;
use crate::{Error, Result};

use super::model::{Programme, ProgrammeSource, ProgrammeStreamer};
use super::week::Week;

/// Heatmaps computed concurrently while building one programme.
const HEATMAP_CONCURRENCY: usize = 4;

#[derive(Debug, Clone)]
pub struct ProgrammeConfig {
    /// Size of the global streamer set.
    pub top_n: u32,
    /// Slots below this probability are not shown.
    pub min_probability: f64,
    /// Largest custom selection a user may save.
    pub max_custom_streamers: usize,
}

impl Default for ProgrammeConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            min_probability: 0.02,
            max_custom_streamers: 50,
        }
    }
}

pub struct ProgrammeService {
    streamers: Arc<dyn StreamerRepository>,
    follows: Arc<dyn FollowRepository>,
    custom: Arc<dyn CustomProgrammeRepository>,
    heatmaps: Arc<HeatmapService>,
    config: ProgrammeConfig,
}

impl ProgrammeService {
    pub fn new(
        streamers: Arc<dyn StreamerRepository>,
        follows: Arc<dyn FollowRepository>,
        custom: Arc<dyn CustomProgrammeRepository>,
        heatmaps: Arc<HeatmapService>,
    ) -> Self {
        Self::with_config(streamers, follows, custom, heatmaps, ProgrammeConfig::default())
    }

    pub fn with_config(
        streamers: Arc<dyn StreamerRepository>,
        follows: Arc<dyn FollowRepository>,
        custom: Arc<dyn CustomProgrammeRepository>,
        heatmaps: Arc<HeatmapService>,
        config: ProgrammeConfig,
    ) -> Self {
        Self {
            streamers,
            follows,
            custom,
            heatmaps,
            config,
        }
    }

    /// Programme for a user, or for the public when `user_id` is `None`.
    ///
    /// A non-empty custom selection wins. An empty or unreadable one falls
    /// back to the global view, whose failure is the only error returned.
    pub async fn generate_programme(&self, user_id: Option<&str>, week: Week) -> Result<Programme> {
        if let Some(user_id) = user_id {
            match self.custom.get(user_id).await {
                Ok(ids) if !ids.is_empty() => {
                    debug!(user_id, streamers = ids.len(), %week, "Generating custom programme");
                    let ids: Vec<(String, Option<u64>)> =
                        ids.into_iter().map(|id| (id, None)).collect();
                    let streamers = self.load_streamers(&ids).await;
                    return Ok(self.build(week, ProgrammeSource::Custom, streamers));
                }
                Ok(_) => debug!(user_id, "No custom programme, using global view"),
                Err(e) => warn!(
                    user_id,
                    "Failed to load custom programme, using global view: {}", e
                ),
            }
        }

        self.get_default_week_view(week).await
    }

    /// Programme of the most-followed streamers.
    pub async fn get_default_week_view(&self, week: Week) -> Result<Programme> {
        let ranking = self.follows.top_streamers(self.config.top_n).await?;
        let ids: Vec<(String, Option<u64>)> = ranking
            .into_iter()
            .map(|r| (r.streamer_id, Some(r.follower_count)))
            .collect();
        debug!(streamers = ids.len(), %week, "Generating global programme");

        let streamers = self.load_streamers(&ids).await;
        Ok(self.build(week, ProgrammeSource::Global, streamers))
    }

    /// Replace a user's custom selection.
    ///
    /// Ids are trimmed and de-duplicated keeping first occurrence. Every id
    /// must name an existing streamer. Saving an empty list clears the
    /// selection. Returns the ids as stored.
    pub async fn save_custom_programme(
        &self,
        user_id: &str,
        streamer_ids: &[String],
    ) -> Result<Vec<String>> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(Error::validation("user id must not be empty"));
        }

        let mut seen = HashSet::new();
        let ids: Vec<String> = streamer_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .map(str::to_string)
            .collect();

        if ids.len() > self.config.max_custom_streamers {
            return Err(Error::validation(format!(
                "custom programme may contain at most {} streamers, got {}",
                self.config.max_custom_streamers,
                ids.len()
            )));
        }

        if ids.is_empty() {
            self.custom.clear(user_id).await?;
            info!(user_id, "Cleared custom programme");
            return Ok(ids);
        }

        for id in &ids {
            self.streamers.get(id).await?;
        }

        self.custom.set(user_id, &ids).await?;
        info!(user_id, streamers = ids.len(), "Saved custom programme");
        Ok(ids)
    }

    pub async fn get_custom_programme(&self, user_id: &str) -> Result<Vec<String>> {
        self.custom.get(user_id).await
    }

    pub async fn clear_custom_programme(&self, user_id: &str) -> Result<()> {
        self.custom.clear(user_id).await?;
        info!(user_id, "Cleared custom programme");
        Ok(())
    }

    fn build(
        &self,
        week: Week,
        source: ProgrammeSource,
        streamers: Vec<ProgrammeStreamer>,
    ) -> Programme {
        Programme::build(week, source, streamers, self.config.min_probability)
    }

    /// Resolve ids to streamers with heatmaps, preserving order. Streamers
    /// that are gone or whose history cannot be read are left out. Ids
    /// without a known follower count have it looked up.
    async fn load_streamers(&self, ids: &[(String, Option<u64>)]) -> Vec<ProgrammeStreamer> {
        stream::iter(ids)
            .map(|(id, follower_count)| self.load_streamer(id, *follower_count))
            .buffered(HEATMAP_CONCURRENCY)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn load_streamer(
        &self,
        streamer_id: &str,
        follower_count: Option<u64>,
    ) -> Option<ProgrammeStreamer> {
        let streamer = match self.streamers.get(streamer_id).await {
            Ok(streamer) => streamer,
            Err(e) => {
                warn!(streamer_id, "Leaving streamer out of programme: {}", e);
                return None;
            }
        };

        let follower_count = match follower_count {
            Some(count) => count,
            None => self
                .follows
                .follower_count(streamer_id)
                .await
                .unwrap_or_else(|e| {
                    warn!(streamer_id, "Failed to count followers: {}", e);
                    0
                }),
        };

        match self.heatmaps.generate_heatmap(streamer_id).await {
            Ok(heatmap) => Some(ProgrammeStreamer {
                streamer_id: streamer.id,
                name: streamer.name,
                follower_count,
                heatmap,
            }),
            Err(e) => {
                warn!(streamer_id, "Failed to generate heatmap, leaving streamer out: {}", e);
                None
            }
        }
    }
}
