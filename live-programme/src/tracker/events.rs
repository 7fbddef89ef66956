//! Tracker events for downstream consumers (notifications, UI push).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by the activity tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ActivityEvent {
    /// A new live session was detected and recorded.
    WentLive {
        streamer_id: String,
        streamer_name: String,
        platform: String,
        title: Option<String>,
        record_id: String,
        timestamp: DateTime<Utc>,
    },
    /// A streamer previously observed live is now offline.
    WentOffline {
        streamer_id: String,
        streamer_name: String,
        timestamp: DateTime<Utc>,
    },
}

impl ActivityEvent {
    pub fn streamer_id(&self) -> &str {
        match self {
            ActivityEvent::WentLive { streamer_id, .. } => streamer_id,
            ActivityEvent::WentOffline { streamer_id, .. } => streamer_id,
        }
    }

    /// Get a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            ActivityEvent::WentLive {
                streamer_name,
                platform,
                title,
                ..
            } => match title {
                Some(title) => format!("{} is live on {}: {}", streamer_name, platform, title),
                None => format!("{} is live on {}", streamer_name, platform),
            },
            ActivityEvent::WentOffline { streamer_name, .. } => {
                format!("{} went offline", streamer_name)
            }
        }
    }
}

/// Broadcaster for activity events.
#[derive(Clone)]
pub struct ActivityEventBroadcaster {
    sender: broadcast::Sender<ActivityEvent>,
}

impl ActivityEventBroadcaster {
    /// Create a new broadcaster with default capacity (256).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: ActivityEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ActivityEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
