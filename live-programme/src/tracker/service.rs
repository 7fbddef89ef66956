//! Activity tracker.
//!
//! Polls the live status of every known streamer on a fixed interval and
//! records one [`ActivityRecord`] per detected offline → live transition.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::database::repositories::{ActivityRepository, StreamerRepository};
use crate::domain::{ActivityRecord, ObservedState, Streamer};
use crate::live_status::{LiveStatus, LiveStatusService};
use crate::{Error, Result};

use super::events::{ActivityEvent, ActivityEventBroadcaster};

/// Configuration for the activity tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Time between check cycles.
    pub interval: Duration,
    /// Maximum number of streamers checked per cycle.
    pub page_size: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            page_size: 500,
        }
    }
}

/// Outcome of one check cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    /// Streamers whose status was observed.
    pub checked: usize,
    /// Activity records written.
    pub went_live: usize,
    /// Streamers skipped because no current status was available.
    pub skipped: usize,
}

struct TrackerInner {
    streamers: Arc<dyn StreamerRepository>,
    activity: Arc<dyn ActivityRepository>,
    live_status: Arc<LiveStatusService>,
    /// Last observation per streamer id. Absent means unknown.
    states: Mutex<HashMap<String, ObservedState>>,
    /// Held for a whole check cycle; cycles never overlap.
    cycle_lock: tokio::sync::Mutex<()>,
    events: ActivityEventBroadcaster,
    config: TrackerConfig,
}

enum Outcome {
    Checked { went_live: bool },
    Skipped,
    Cancelled,
}

struct RunningTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Background live-transition detector.
///
/// Each instance owns its own state table; two trackers never share
/// observations.
pub struct ActivityTracker {
    inner: Arc<TrackerInner>,
    task: Mutex<Option<RunningTask>>,
}

impl ActivityTracker {
    pub fn new(
        streamers: Arc<dyn StreamerRepository>,
        activity: Arc<dyn ActivityRepository>,
        live_status: Arc<LiveStatusService>,
    ) -> Self {
        Self::with_config(
            streamers,
            activity,
            live_status,
            ActivityEventBroadcaster::new(),
            TrackerConfig::default(),
        )
    }

    pub fn with_config(
        streamers: Arc<dyn StreamerRepository>,
        activity: Arc<dyn ActivityRepository>,
        live_status: Arc<LiveStatusService>,
        events: ActivityEventBroadcaster,
        config: TrackerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                streamers,
                activity,
                live_status,
                states: Mutex::new(HashMap::new()),
                cycle_lock: tokio::sync::Mutex::new(()),
                events,
                config,
            }),
            task: Mutex::new(None),
        }
    }

    /// Start the background loop.
    ///
    /// Runs one check immediately, then one per interval, until
    /// [`stop`](Self::stop) is called or `parent` is cancelled.
    pub fn start(&self, parent: &CancellationToken) -> Result<()> {
        let mut task = self.task.lock();
        if let Some(running) = task.as_ref()
            && !running.handle.is_finished()
        {
            return Err(Error::validation("activity tracker is already running"));
        }

        let cancel = parent.child_token();
        let inner = self.inner.clone();
        let loop_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            inner.run_loop(loop_cancel).await;
        });

        info!(
            interval_secs = self.inner.config.interval.as_secs(),
            page_size = self.inner.config.page_size,
            "Activity tracker started"
        );

        *task = Some(RunningTask { cancel, handle });
        Ok(())
    }

    /// Stop the background loop and wait for it to finish.
    ///
    /// A record write already in progress finishes first; no activity
    /// record is written after this returns. Calling it when
    /// the tracker is not running is a no-op.
    pub async fn stop(&self) {
        let running = self.task.lock().take();
        let Some(RunningTask { cancel, handle }) = running else {
            return;
        };

        cancel.cancel();
        if let Err(e) = handle.await {
            warn!("Activity tracker task ended abnormally: {}", e);
        }
        info!("Activity tracker stopped");
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// Run a single check cycle now.
    ///
    /// If the background loop is mid-cycle, waits for that cycle to finish
    /// first.
    pub async fn check_once(&self) -> CheckSummary {
        self.inner.run_cycle(&CancellationToken::new()).await
    }

    /// Last observed state of a streamer.
    pub fn observed_state(&self, streamer_id: &str) -> ObservedState {
        self.inner
            .states
            .lock()
            .get(streamer_id)
            .copied()
            .unwrap_or_default()
    }

    /// Copy of the whole observation table.
    pub fn snapshot(&self) -> HashMap<String, ObservedState> {
        self.inner.states.lock().clone()
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ActivityEvent> {
        self.inner.events.subscribe()
    }
}

impl TrackerInner {
    async fn run_loop(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("Activity tracker loop shutting down");
                    break;
                }
                _ = interval.tick() => {}
            }

            let summary = self.run_cycle(&cancel).await;
            debug!(
                checked = summary.checked,
                went_live = summary.went_live,
                skipped = summary.skipped,
                "Activity check cycle completed"
            );
        }
    }

    async fn run_cycle(&self, cancel: &CancellationToken) -> CheckSummary {
        let _cycle = self.cycle_lock.lock().await;
        let mut summary = CheckSummary::default();
        if cancel.is_cancelled() {
            return summary;
        }

        let streamers = match self.streamers.list(self.config.page_size).await {
            Ok(streamers) => streamers,
            Err(e) => {
                warn!("Failed to list streamers for activity check: {}", e);
                return summary;
            }
        };

        for streamer in &streamers {
            match self.check_streamer(streamer, cancel).await {
                Outcome::Checked { went_live } => {
                    summary.checked += 1;
                    summary.went_live += went_live as usize;
                }
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Cancelled => break,
            }
        }

        self.live_status.purge_expired();
        summary
    }

    /// Observe one streamer.
    ///
    /// Only the status fetch is abandoned on cancellation. Once a record
    /// write has started, it and the state update run to completion.
    async fn check_streamer(&self, streamer: &Streamer, cancel: &CancellationToken) -> Outcome {
        let status = tokio::select! {
            biased;

            _ = cancel.cancelled() => return Outcome::Cancelled,
            status = self.live_status.get_live_status_for(streamer) => status,
        };

        if status.is_degraded() {
            warn!(
                streamer_id = %streamer.id,
                freshness = %status.freshness,
                "No current live status, skipping streamer this cycle"
            );
            return Outcome::Skipped;
        }

        let previous = self
            .states
            .lock()
            .get(&streamer.id)
            .copied()
            .unwrap_or_default();
        let (next, went_live) = previous.observe(status.is_live);

        if went_live {
            let Some(record) = self.record_live(streamer, &status).await else {
                return Outcome::Skipped;
            };
            self.events.publish(ActivityEvent::WentLive {
                streamer_id: streamer.id.clone(),
                streamer_name: streamer.name.clone(),
                platform: record.platform.clone(),
                title: status.title.clone(),
                record_id: record.id,
                timestamp: record.start_time,
            });
        } else if previous.is_live() && !next.is_live() {
            info!(streamer_id = %streamer.id, "Streamer went offline");
            self.events.publish(ActivityEvent::WentOffline {
                streamer_id: streamer.id.clone(),
                streamer_name: streamer.name.clone(),
                timestamp: Utc::now(),
            });
        }

        self.states.lock().insert(streamer.id.clone(), next);
        Outcome::Checked { went_live }
    }

    /// Persist the go-live marker. On failure the observation is dropped
    /// so the next cycle retries the transition.
    async fn record_live(&self, streamer: &Streamer, status: &LiveStatus) -> Option<ActivityRecord> {
        let platform = status
            .platform
            .as_deref()
            .or_else(|| streamer.primary_platform())
            .unwrap_or("unknown");
        let record = ActivityRecord::live_marker(&streamer.id, platform, Utc::now());

        match self.activity.create(&record).await {
            Ok(()) => {
                info!(
                    streamer_id = %streamer.id,
                    platform,
                    record_id = %record.id,
                    "Recorded new live session"
                );
                Some(record)
            }
            Err(e) => {
                warn!(streamer_id = %streamer.id, "Failed to record live session: {}", e);
                None
            }
        }
    }
}
