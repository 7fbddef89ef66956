//! Background detection of offline → live transitions.

mod events;
mod service;

pub use events::{ActivityEvent, ActivityEventBroadcaster};
pub use service::{ActivityTracker, CheckSummary, TrackerConfig};
