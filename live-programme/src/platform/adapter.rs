//! Platform adapter abstraction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::PlatformError;

/// What a platform reports about a single channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformLiveStatus {
    pub is_live: bool,
    pub title: Option<String>,
    pub stream_url: Option<String>,
    pub viewer_count: Option<u64>,
    /// When the current broadcast started, if the platform says so.
    pub started_at: Option<DateTime<Utc>>,
}

impl PlatformLiveStatus {
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn live(title: impl Into<String>) -> Self {
        Self {
            is_live: true,
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// One upstream streaming platform.
///
/// Implementations own their auth, rate limiting and response parsing.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Platform name used as the key in a streamer's handle map.
    fn platform(&self) -> &str;

    /// Query the live status of the channel identified by `handle`.
    async fn get_live_status(&self, handle: &str) -> Result<PlatformLiveStatus, PlatformError>;
}

/// Adapters keyed by platform name.
#[derive(Clone, Default)]
pub struct PlatformRegistry {
    adapters: HashMap<String, Arc<dyn PlatformAdapter>>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter, replacing any previous one for the same platform.
    pub fn register(&mut self, adapter: Arc<dyn PlatformAdapter>) {
        self.adapters.insert(adapter.platform().to_string(), adapter);
    }

    pub fn with(mut self, adapter: Arc<dyn PlatformAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn get(&self, platform: &str) -> Option<&Arc<dyn PlatformAdapter>> {
        self.adapters.get(platform)
    }

    pub fn platforms(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for PlatformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformRegistry")
            .field("platforms", &self.platforms())
            .finish()
    }
}
