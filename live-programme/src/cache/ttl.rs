//! Expiring key/value store.
//!
//! A single reader/writer lock guards the whole map. Expired entries are
//! never returned but are only removed by [`TtlCache::cleanup`],
//! [`TtlCache::delete`] or [`TtlCache::clear`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Default TTL for cached values (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    /// `None` when the TTL is too large to represent; such entries never expire.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }
}

/// Thread-safe TTL cache keyed by string.
///
/// Cloning the cache is cheap and yields a handle to the same map.
pub struct TtlCache<V> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create a new cache with the default TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a new cache with the given default TTL.
    pub fn with_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
        }
    }

    /// Store a value with the cache's default TTL.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Store a value with a per-entry TTL.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry::new(value, ttl);
        self.entries.write().insert(key.into(), entry);
    }

    /// Get a value.
    ///
    /// Returns `None` if the key is absent or its entry has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.is_expired_at(Instant::now()) {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Remove a key, returning whether it was present (expired or not).
    pub fn delete(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Remove all expired entries, returning how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    /// Raw entry count, including expired entries not yet swept.
    pub fn size(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.entries.read();
        let expired_count = entries.values().filter(|e| e.is_expired_at(now)).count();
        CacheStats {
            entry_count: entries.len(),
            expired_count,
            default_ttl: self.default_ttl,
        }
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            default_ttl: self.default_ttl,
        }
    }
}

/// Statistics about a TTL cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries, expired or not.
    pub entry_count: usize,
    /// Entries that have expired but not been swept.
    pub expired_count: usize,
    /// Default TTL for new entries.
    pub default_ttl: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let cache = TtlCache::new();
        cache.set("k", "v".to_string());
        assert_eq!(cache.get("k"), Some("v".to_string()));
    }

    #[test]
    fn test_cache_miss() {
        let cache: TtlCache<String> = TtlCache::new();
        assert!(cache.get("nonexistent").is_none());
    }

    #[test]
    fn test_ttl_expiration_is_lazy() {
        let cache = TtlCache::with_ttl(Duration::from_millis(10));
        cache.set("k", 1u32);
        assert_eq!(cache.get("k"), Some(1));

        std::thread::sleep(Duration::from_millis(20));

        assert!(cache.get("k").is_none());
        // Get does not sweep.
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_set_with_ttl_overrides_default() {
        let cache = TtlCache::with_ttl(Duration::from_millis(10));
        cache.set_with_ttl("long", 1u32, Duration::from_secs(60));
        cache.set("short", 2u32);

        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.get("long"), Some(1));
        assert!(cache.get("short").is_none());
    }

    #[test]
    fn test_cleanup_keeps_live_entries() {
        let cache = TtlCache::with_ttl(Duration::from_millis(10));
        cache.set("a", 1u32);
        cache.set("b", 2u32);
        cache.set_with_ttl("c", 3u32, Duration::from_secs(60));

        std::thread::sleep(Duration::from_millis(20));

        assert_eq!(cache.size(), 3);
        assert_eq!(cache.stats().expired_count, 2);

        let removed = cache.cleanup();
        assert_eq!(removed, 2);
        assert_eq!(cache.size(), 1);
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = TtlCache::new();
        cache.set("a", 1u32);
        cache.set("b", 2u32);

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert!(cache.get("a").is_none());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overwrite_resets_expiry() {
        let cache = TtlCache::with_ttl(Duration::from_millis(10));
        cache.set("k", 1u32);
        std::thread::sleep(Duration::from_millis(20));
        cache.set("k", 2u32);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = TtlCache::new();
        let other = cache.clone();
        cache.set("k", 7u32);
        assert_eq!(other.get("k"), Some(7));
    }

    #[test]
    fn test_concurrent_access() {
        let cache = TtlCache::new();
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let key = format!("{t}-{i}");
                        cache.set(key.clone(), i);
                        assert_eq!(cache.get(&key), Some(i));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.size(), 800);
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let cache = TtlCache::new();
        cache.set_with_ttl("forever", 1, Duration::MAX);

        assert_eq!(cache.get("forever"), Some(1));
        assert_eq!(cache.cleanup(), 0);
        assert_eq!(cache.stats().expired_count, 0);
    }
}
