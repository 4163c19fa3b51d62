//! In-memory fetch cache with a time-to-live.
//!
//! Keyed by `(symbol, timeframe)`. Entries older than the TTL are treated as
//! absent. Concurrent writers race and the last insert wins; values are
//! recomputed idempotently so nothing is lost.

use crate::domain::Timeframe;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Cache key for fetched series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl CacheKey {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Time-bounded cache. Values are cloned out, so store `Arc`s for large data.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fresh value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.lock();
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Store a value; replaces any previous entry.
    pub fn insert(&self, key: K, value: V) {
        self.lock().insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drop expired entries and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn fresh_entry_is_returned() {
        let cache: TtlCache<CacheKey, Arc<String>> = TtlCache::new(Duration::from_secs(60));
        let key = CacheKey::new("AAPL", Timeframe::D1);
        cache.insert(key.clone(), Arc::new("bars".into()));
        assert_eq!(cache.get(&key).as_deref().map(String::as_str), Some("bars"));
        assert!(cache.get(&CacheKey::new("AAPL", Timeframe::H1)).is_none());
    }

    #[test]
    fn expired_entry_is_absent() {
        let cache = TtlCache::new(Duration::from_millis(10));
        cache.insert("k", 1);
        std::thread::sleep(Duration::from_millis(15));
        assert_eq!(cache.get(&"k"), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn last_writer_wins() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("k", 1);
        cache.insert("k", 2);
        assert_eq!(cache.get(&"k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_drops_everything() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_inserts_are_safe() {
        let cache = Arc::new(TtlCache::new(Duration::from_secs(60)));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.insert("shared", i))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(cache.get(&"shared").is_some());
        assert_eq!(cache.len(), 1);
    }
}
