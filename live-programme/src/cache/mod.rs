//! In-memory caching shared by request handlers and the activity tracker.

mod ttl;

pub use ttl::{CacheStats, DEFAULT_TTL, TtlCache};
