//! Live status service.
//!
//! Answers "is this streamer live right now" through the TTL cache, the
//! platform adapters and the persisted fallback copy, in that order.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{CacheStats, TtlCache};
use crate::database::repositories::{LiveStatusRepository, StreamerRepository};
use crate::domain::Streamer;
use crate::platform::PlatformRegistry;
use crate::{Error, Result};

use super::status::{LiveStatus, StatusFreshness};

/// Configuration for the live status service.
#[derive(Debug, Clone)]
pub struct LiveStatusConfig {
    /// How long a successful platform answer is served from the cache.
    pub cache_ttl: Duration,
    /// How long a degraded (stale or unknown) answer is served from the
    /// cache before the platform is asked again.
    pub fallback_ttl: Duration,
}

impl Default for LiveStatusConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(60),
            fallback_ttl: Duration::from_secs(15),
        }
    }
}

pub struct LiveStatusService {
    streamers: Arc<dyn StreamerRepository>,
    store: Arc<dyn LiveStatusRepository>,
    registry: PlatformRegistry,
    cache: TtlCache<LiveStatus>,
    config: LiveStatusConfig,
}

fn cache_key(streamer_id: &str) -> String {
    format!("live_status:{streamer_id}")
}

impl LiveStatusService {
    pub fn new(
        streamers: Arc<dyn StreamerRepository>,
        store: Arc<dyn LiveStatusRepository>,
        registry: PlatformRegistry,
    ) -> Self {
        Self::with_config(streamers, store, registry, LiveStatusConfig::default())
    }

    pub fn with_config(
        streamers: Arc<dyn StreamerRepository>,
        store: Arc<dyn LiveStatusRepository>,
        registry: PlatformRegistry,
        config: LiveStatusConfig,
    ) -> Self {
        let cache = TtlCache::with_ttl(config.cache_ttl);
        Self {
            streamers,
            store,
            registry,
            cache,
            config,
        }
    }

    /// Current status of a streamer, served from cache when possible.
    ///
    /// Platform failures never surface as errors: the last persisted value
    /// is returned as [`StatusFreshness::Stale`], or an
    /// [`StatusFreshness::Unknown`] status when nothing was known. Only a
    /// missing streamer or a directory failure is an error.
    pub async fn get_live_status(&self, streamer_id: &str) -> Result<LiveStatus> {
        let streamer = self.streamers.get(streamer_id).await?;
        Ok(self.get_live_status_for(&streamer).await)
    }

    /// Same as [`get_live_status`](Self::get_live_status) for an already
    /// resolved streamer.
    pub async fn get_live_status_for(&self, streamer: &Streamer) -> LiveStatus {
        let key = cache_key(&streamer.id);
        if let Some(cached) = self.cache.get(&key) {
            debug!(streamer_id = %streamer.id, freshness = %cached.freshness, "Live status cache hit");
            return match cached.freshness {
                StatusFreshness::Fresh => cached.with_freshness(StatusFreshness::Cached),
                _ => cached,
            };
        }

        match self.query_platforms(streamer).await {
            Ok(status) => {
                self.store_status(&status).await;
                status
            }
            Err(e) => {
                warn!(streamer_id = %streamer.id, "Live status check failed, serving fallback: {}", e);
                let fallback = self.fallback(&streamer.id).await;
                self.cache
                    .set_with_ttl(key, fallback.clone(), self.config.fallback_ttl);
                fallback
            }
        }
    }

    /// Ask the platforms now, bypassing the cache.
    ///
    /// On platform failure the persisted value is returned as stale; if
    /// there is none, the platform error is returned.
    pub async fn refresh_live_status(&self, streamer_id: &str) -> Result<LiveStatus> {
        let streamer = self.streamers.get(streamer_id).await?;

        match self.query_platforms(&streamer).await {
            Ok(status) => {
                self.store_status(&status).await;
                Ok(status)
            }
            Err(e) => match self.persisted(streamer_id).await {
                Some(stale) => {
                    warn!(streamer_id, "Refresh failed, serving stale status: {}", e);
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }

    /// Drop a streamer's cached status.
    pub fn invalidate(&self, streamer_id: &str) {
        self.cache.delete(&cache_key(streamer_id));
    }

    /// Sweep expired cache entries.
    pub fn purge_expired(&self) -> usize {
        let removed = self.cache.cleanup();
        if removed > 0 {
            debug!(removed, "Purged expired live status entries");
        }
        removed
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Query adapters in platform-name order.
    ///
    /// The first platform reporting live wins. Otherwise the streamer is
    /// offline on the first platform that answered, unless any platform
    /// failed, in which case the failure is returned.
    async fn query_platforms(&self, streamer: &Streamer) -> Result<LiveStatus> {
        let mut offline: Option<LiveStatus> = None;
        let mut failure: Option<Error> = None;

        for (platform, handle) in &streamer.handles {
            let Some(adapter) = self.registry.get(platform) else {
                debug!(streamer_id = %streamer.id, platform = %platform, "No adapter registered, skipping");
                continue;
            };

            match adapter.get_live_status(handle).await {
                Ok(status) if status.is_live => {
                    return Ok(LiveStatus::from_platform(&streamer.id, platform, status));
                }
                Ok(status) => {
                    if offline.is_none() {
                        offline = Some(LiveStatus::from_platform(&streamer.id, platform, status));
                    }
                }
                Err(e) => {
                    if e.is_transient() {
                        debug!(streamer_id = %streamer.id, platform = %platform, handle = %handle, "Platform check failed: {}", e);
                    } else {
                        warn!(streamer_id = %streamer.id, platform = %platform, handle = %handle, "Platform check failed: {}", e);
                    }
                    failure = Some(Error::from_platform(platform, handle, e));
                }
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }

        offline.ok_or_else(|| {
            Error::Other(format!(
                "no supported platform for streamer {}",
                streamer.id
            ))
        })
    }

    async fn store_status(&self, status: &LiveStatus) {
        self.cache
            .set(cache_key(&status.streamer_id), status.clone());

        if let Err(e) = self.store.upsert(status).await {
            warn!(streamer_id = %status.streamer_id, "Failed to persist live status: {}", e);
        }

        if status.is_live {
            debug!(
                streamer_id = %status.streamer_id,
                platform = status.platform.as_deref().unwrap_or_default(),
                "Streamer is live"
            );
        }
    }

    async fn persisted(&self, streamer_id: &str) -> Option<LiveStatus> {
        match self.store.get(streamer_id).await {
            Ok(status) => status.map(|s| s.with_freshness(StatusFreshness::Stale)),
            Err(e) => {
                warn!(streamer_id, "Failed to read persisted live status: {}", e);
                None
            }
        }
    }

    async fn fallback(&self, streamer_id: &str) -> LiveStatus {
        self.persisted(streamer_id)
            .await
            .unwrap_or_else(|| LiveStatus::unknown(streamer_id))
    }
}
