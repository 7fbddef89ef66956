//! Live status lookups with caching and fallback.

mod service;
mod status;

pub use service::{LiveStatusConfig, LiveStatusService};
pub use status::{LiveStatus, StatusFreshness};
