//! Service container for dependency injection.
//!
//! The ServiceContainer wires repositories, platform adapters and services
//! together and owns the tracker's lifecycle.

use std::sync::Arc;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::Result;
use crate::config::AppConfig;
use crate::database::repositories::{
    ActivityRepository, CustomProgrammeRepository, FollowRepository, LiveStatusRepository,
    SqlxActivityRepository, SqlxCustomProgrammeRepository, SqlxFollowRepository,
    SqlxLiveStatusRepository, SqlxStreamerRepository, StreamerRepository,
};
use crate::heatmap::HeatmapService;
use crate::live_status::LiveStatusService;
use crate::platform::{PlatformRegistry, TwitchAdapter};
use crate::programme::ProgrammeService;
use crate::tracker::{ActivityEventBroadcaster, ActivityTracker};
use crate::utils::http_client::build_platform_client;

/// Idle connections kept per upstream host.
const PLATFORM_POOL_MAX_IDLE: usize = 4;

pub struct ServiceContainer {
    pub pool: SqlitePool,
    pub streamers: Arc<dyn StreamerRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub live_status: Arc<LiveStatusService>,
    pub heatmaps: Arc<HeatmapService>,
    pub programmes: Arc<ProgrammeService>,
    pub tracker: Arc<ActivityTracker>,
    /// Tracker events (shared with subscribers).
    pub activity_events: ActivityEventBroadcaster,
    cancellation_token: CancellationToken,
}

impl ServiceContainer {
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        let registry = build_registry(config);
        Self::with_registry(pool, config, registry)
    }

    /// Create a container with an explicit set of platform adapters.
    pub fn with_registry(pool: SqlitePool, config: &AppConfig, registry: PlatformRegistry) -> Self {
        info!("Initializing service container");

        let streamers: Arc<dyn StreamerRepository> =
            Arc::new(SqlxStreamerRepository::new(pool.clone()));
        let follows: Arc<dyn FollowRepository> = Arc::new(SqlxFollowRepository::new(pool.clone()));
        let activity: Arc<dyn ActivityRepository> =
            Arc::new(SqlxActivityRepository::new(pool.clone()));
        let live_status_store: Arc<dyn LiveStatusRepository> =
            Arc::new(SqlxLiveStatusRepository::new(pool.clone()));
        let custom: Arc<dyn CustomProgrammeRepository> =
            Arc::new(SqlxCustomProgrammeRepository::new(pool.clone()));

        if registry.is_empty() {
            warn!("No platform adapters configured; every live status will be unknown");
        } else {
            info!(platforms = ?registry.platforms(), "Platform adapters registered");
        }

        let live_status = Arc::new(LiveStatusService::with_config(
            streamers.clone(),
            live_status_store,
            registry,
            config.live_status.clone(),
        ));
        let heatmaps = Arc::new(HeatmapService::with_config(
            activity.clone(),
            config.heatmap.clone(),
        ));
        let programmes = Arc::new(ProgrammeService::with_config(
            streamers.clone(),
            follows.clone(),
            custom,
            heatmaps.clone(),
            config.programme.clone(),
        ));

        let activity_events = ActivityEventBroadcaster::new();
        let tracker = Arc::new(ActivityTracker::with_config(
            streamers.clone(),
            activity,
            live_status.clone(),
            activity_events.clone(),
            config.tracker.clone(),
        ));

        Self {
            pool,
            streamers,
            follows,
            live_status,
            heatmaps,
            programmes,
            tracker,
            activity_events,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Start background work.
    pub fn start(&self) -> Result<()> {
        self.tracker.start(&self.cancellation_token)
    }

    /// Token cancelled on shutdown; child tasks should derive from it.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    /// Stop background work and wait for it to finish.
    pub async fn shutdown(&self) {
        info!("Shutting down services");
        self.cancellation_token.cancel();
        self.tracker.stop().await;
        info!("Services shut down");
    }
}

fn build_registry(config: &AppConfig) -> PlatformRegistry {
    let mut registry = PlatformRegistry::new();

    if let Some(twitch) = &config.twitch {
        let client = build_platform_client(config.platform_timeout, PLATFORM_POOL_MAX_IDLE);
        registry.register(Arc::new(TwitchAdapter::new(
            client,
            twitch.client_id.clone(),
            twitch.access_token.clone(),
        )));
    }

    registry
}
