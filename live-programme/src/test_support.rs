//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::database::repositories::{
    ActivityRepository, CustomProgrammeRepository, FollowRepository, LiveStatusRepository,
    StreamerRanking, StreamerRepository,
};
use crate::domain::{ActivityRecord, Streamer};
use crate::live_status::LiveStatus;
use crate::platform::{PlatformAdapter, PlatformError, PlatformLiveStatus};
use crate::{Error, Result};

fn storage_error() -> Error {
    Error::Database(sqlx::Error::PoolTimedOut)
}

/// Initialize tracing for tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
pub struct InMemoryStreamers {
    streamers: Mutex<Vec<Streamer>>,
    pub fail: AtomicBool,
}

impl InMemoryStreamers {
    pub fn with(streamers: Vec<Streamer>) -> Arc<Self> {
        Arc::new(Self {
            streamers: Mutex::new(streamers),
            fail: AtomicBool::new(false),
        })
    }
}

#[async_trait]
impl StreamerRepository for InMemoryStreamers {
    async fn list(&self, limit: u32) -> Result<Vec<Streamer>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(storage_error());
        }
        let mut streamers = self.streamers.lock().clone();
        streamers.sort_by(|a, b| a.id.cmp(&b.id));
        streamers.truncate(limit as usize);
        Ok(streamers)
    }

    async fn get(&self, id: &str) -> Result<Streamer> {
        self.streamers
            .lock()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| Error::not_found("Streamer", id))
    }

    async fn create(&self, streamer: &Streamer) -> Result<()> {
        self.streamers.lock().push(streamer.clone());
        Ok(())
    }

    async fn update(&self, streamer: &Streamer) -> Result<()> {
        let mut streamers = self.streamers.lock();
        let existing = streamers
            .iter_mut()
            .find(|s| s.id == streamer.id)
            .ok_or_else(|| Error::not_found("Streamer", &streamer.id))?;
        *existing = streamer.clone();
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryActivity {
    records: Mutex<Vec<ActivityRecord>>,
    create_delay: Mutex<Duration>,
    pub fail_reads: AtomicBool,
}

impl InMemoryActivity {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every `create` take at least `delay` before it stores.
    pub fn set_create_delay(&self, delay: Duration) {
        *self.create_delay.lock() = delay;
    }

    pub fn records(&self) -> Vec<ActivityRecord> {
        self.records.lock().clone()
    }

    pub fn count_for(&self, streamer_id: &str) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.streamer_id == streamer_id)
            .count()
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivity {
    async fn create(&self, record: &ActivityRecord) -> Result<()> {
        let delay = *self.create_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.records.lock().push(record.clone());
        Ok(())
    }

    async fn get_by_streamer_id(
        &self,
        streamer_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActivityRecord>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(storage_error());
        }
        let mut records: Vec<ActivityRecord> = self
            .records
            .lock()
            .iter()
            .filter(|r| r.streamer_id == streamer_id)
            .filter(|r| since.is_none_or(|since| r.start_time >= since))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        Ok(records)
    }
}

#[derive(Default)]
pub struct InMemoryLiveStatuses {
    statuses: Mutex<HashMap<String, LiveStatus>>,
    pub fail_writes: AtomicBool,
}

impl InMemoryLiveStatuses {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl LiveStatusRepository for InMemoryLiveStatuses {
    async fn get(&self, streamer_id: &str) -> Result<Option<LiveStatus>> {
        Ok(self.statuses.lock().get(streamer_id).cloned().map(|s| {
            s.with_freshness(crate::live_status::StatusFreshness::Stale)
        }))
    }

    async fn upsert(&self, status: &LiveStatus) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(storage_error());
        }
        self.statuses
            .lock()
            .insert(status.streamer_id.clone(), status.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryFollows {
    follows: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl InMemoryFollows {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Give `streamer_id` `count` distinct followers.
    pub fn add_followers(&self, streamer_id: &str, count: usize) {
        let mut follows = self.follows.lock();
        let existing = follows.iter().filter(|(_, s)| s == streamer_id).count();
        for i in existing..existing + count {
            follows.push((format!("user-{streamer_id}-{i}"), streamer_id.to_string()));
        }
    }
}

#[async_trait]
impl FollowRepository for InMemoryFollows {
    async fn top_streamers(&self, limit: u32) -> Result<Vec<StreamerRanking>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(storage_error());
        }
        let mut counts: HashMap<String, u64> = HashMap::new();
        for (_, streamer_id) in self.follows.lock().iter() {
            *counts.entry(streamer_id.clone()).or_default() += 1;
        }
        let mut ranking: Vec<StreamerRanking> = counts
            .into_iter()
            .map(|(streamer_id, follower_count)| StreamerRanking {
                streamer_id,
                follower_count,
            })
            .collect();
        ranking.sort_by(|a, b| {
            b.follower_count
                .cmp(&a.follower_count)
                .then_with(|| a.streamer_id.cmp(&b.streamer_id))
        });
        ranking.truncate(limit as usize);
        Ok(ranking)
    }

    async fn follow(&self, user_id: &str, streamer_id: &str) -> Result<()> {
        let mut follows = self.follows.lock();
        let pair = (user_id.to_string(), streamer_id.to_string());
        if !follows.contains(&pair) {
            follows.push(pair);
        }
        Ok(())
    }

    async fn follower_count(&self, streamer_id: &str) -> Result<u64> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(storage_error());
        }
        Ok(self
            .follows
            .lock()
            .iter()
            .filter(|(_, s)| s == streamer_id)
            .count() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryCustomProgrammes {
    programmes: Mutex<HashMap<String, Vec<String>>>,
    pub fail: AtomicBool,
}

impl InMemoryCustomProgrammes {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl CustomProgrammeRepository for InMemoryCustomProgrammes {
    async fn get(&self, user_id: &str) -> Result<Vec<String>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(storage_error());
        }
        Ok(self
            .programmes
            .lock()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set(&self, user_id: &str, streamer_ids: &[String]) -> Result<()> {
        self.programmes
            .lock()
            .insert(user_id.to_string(), streamer_ids.to_vec());
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> Result<()> {
        self.programmes.lock().remove(user_id);
        Ok(())
    }
}

/// What a [`ScriptedAdapter`] answers for a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Live,
    Offline,
    Fail,
    NotFound,
}

/// Platform adapter whose answers are set by the test.
pub struct ScriptedAdapter {
    platform: String,
    answers: Mutex<HashMap<String, Answer>>,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
}

impl ScriptedAdapter {
    pub fn new(platform: &str) -> Arc<Self> {
        Arc::new(Self {
            platform: platform.to_string(),
            answers: Mutex::new(HashMap::new()),
            delay: Mutex::new(Duration::ZERO),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, handle: &str, answer: Answer) {
        self.answers.lock().insert(handle.to_string(), answer);
    }

    /// Make every answer take `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformAdapter for ScriptedAdapter {
    fn platform(&self) -> &str {
        &self.platform
    }

    async fn get_live_status(&self, handle: &str) -> std::result::Result<PlatformLiveStatus, PlatformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let answer = self
            .answers
            .lock()
            .get(handle)
            .copied()
            .unwrap_or(Answer::Offline);
        match answer {
            Answer::Live => Ok(PlatformLiveStatus::live(format!("{handle} is live"))),
            Answer::Offline => Ok(PlatformLiveStatus::offline()),
            Answer::Fail => Err(PlatformError::Timeout),
            Answer::NotFound => Err(PlatformError::NotFound),
        }
    }
}
