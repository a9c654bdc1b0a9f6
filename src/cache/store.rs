//! Cache Store Module
//!
//! Mutex-guarded wrapper around the LRU engine, one per group.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{ByteView, GroupStats, Lru, OnEvicted};

// == Cache Store ==
/// Serializes every access to one group's LRU engine.
///
/// The engine is built lazily on the first `set`; until then `get` is a
/// miss that allocates nothing.
#[derive(Debug)]
pub struct CacheStore {
    lru: Mutex<Option<Lru<ByteView>>>,
    cache_bytes: usize,
    stats: Arc<GroupStats>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store with a byte budget, reporting evictions into `stats`.
    ///
    /// # Arguments
    /// * `cache_bytes` - Byte budget for keys plus values, 0 for unbounded
    /// * `stats` - Counters of the owning group
    pub fn new(cache_bytes: usize, stats: Arc<GroupStats>) -> Self {
        Self {
            lru: Mutex::new(None),
            cache_bytes,
            stats,
        }
    }

    // == Set ==
    /// Stores a value under `key`, evicting older entries if needed.
    pub fn set(&self, key: &str, value: ByteView) {
        let mut guard = self.lru.lock();
        let lru = guard.get_or_insert_with(|| {
            let stats = Arc::clone(&self.stats);
            let on_evicted: OnEvicted<ByteView> =
                Box::new(move |_key, _value| stats.record_eviction());
            Lru::new(self.cache_bytes, Some(on_evicted))
        });
        lru.set(key.to_string(), value);
    }

    // == Get ==
    /// Returns the cached view for `key` and refreshes its recency.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut guard = self.lru.lock();
        guard.as_mut()?.get(key).cloned()
    }

    // == Size ==
    /// Bytes currently charged against the budget.
    pub fn bytes(&self) -> usize {
        self.lru.lock().as_ref().map_or(0, Lru::used_bytes)
    }

    /// Number of cached entries.
    pub fn items(&self) -> usize {
        self.lru.lock().as_ref().map_or(0, Lru::len)
    }

    #[cfg(test)]
    fn is_initialized(&self) -> bool {
        self.lru.lock().is_some()
    }
}
