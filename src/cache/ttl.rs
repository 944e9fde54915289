//! Size-bounded cache with per-entry expiry and LRU eviction

use indexmap::IndexMap;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

struct Entry<V> {
    value: V,
    inserted: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted) >= self.ttl
    }
}

struct Inner<V> {
    // Least recently used first
    entries: IndexMap<String, Entry<V>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Cache statistics snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Hits over lookups, 0 when nothing was looked up
    pub hit_rate: f64,
}

/// Thread-safe cache of API responses keyed by string
///
/// Entries expire after the cache's TTL (or a TTL given on insert). At
/// capacity the least recently used entry is evicted. Time is read from the
/// tokio clock, so tests can pause and advance it.
pub struct TtlCache<V> {
    inner: Mutex<Inner<V>>,
    ttl: Duration,
    max_size: usize,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: IndexMap::new(),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            ttl,
            max_size: max_size.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        // A panic while holding the lock cannot leave the map half-updated
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live entry and mark it recently used
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.lock();

        let Some(index) = inner.entries.get_index_of(key) else {
            inner.misses += 1;
            return None;
        };

        if inner.entries[index].is_expired(now) {
            inner.entries.shift_remove_index(index);
            inner.misses += 1;
            return None;
        }

        let last = inner.entries.len() - 1;
        inner.entries.move_index(index, last);
        inner.hits += 1;
        Some(inner.entries[last].value.clone())
    }

    /// Insert with the cache's TTL
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.insert_with_ttl(key, value, self.ttl);
    }

    /// Insert with a custom TTL
    pub fn insert_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let mut inner = self.lock();

        if inner.entries.shift_remove(&key).is_none() && inner.entries.len() >= self.max_size {
            if let Some((evicted, _)) = inner.entries.shift_remove_index(0) {
                inner.evictions += 1;
                tracing::trace!(key = %evicted, "evicted least recently used cache entry");
            }
        }

        inner.entries.insert(
            key,
            Entry {
                value,
                inserted: Instant::now(),
                ttl,
            },
        );
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        self.lock().entries.shift_remove(key).map(|entry| entry.value)
    }

    /// Drop every entry and reset the statistics
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.hits = 0;
        inner.misses = 0;
        inner.evictions = 0;
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired(now));
        before - inner.entries.len()
    }

    /// Number of stored entries, expired ones included until purged
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        let lookups = inner.hits + inner.misses;
        CacheStats {
            size: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            hit_rate: if lookups > 0 {
                inner.hits as f64 / lookups as f64
            } else {
                0.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert("prices", 1);
        assert_eq!(cache.get("prices"), Some(1));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("prices"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert_with_ttl("short", "a", Duration::from_secs(5));
        cache.insert("long", "b");

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.get("long"), Some("b"));
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        // Touch "a" so "b" becomes least recently used
        assert_eq!(cache.get("a"), Some(1));
        cache.insert("c", 3);

        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[tokio::test]
    async fn test_stats() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert("a", 1);
        cache.get("a");
        cache.get("a");
        cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 2.0 / 3.0).abs() < 1e-9);

        cache.clear();
        assert_eq!(cache.stats().hit_rate, 0.0);
    }
}
