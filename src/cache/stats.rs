//! Cache Statistics Module
//!
//! Tracks per-group counters for lookups, loads and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Group Stats ==
/// Live counters for one group, updated without locking.
#[derive(Debug, Default)]
pub struct GroupStats {
    gets: AtomicU64,
    cache_hits: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
    local_loads: AtomicU64,
    local_load_errs: AtomicU64,
    evictions: AtomicU64,
}

impl GroupStats {
    /// Creates a new GroupStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_load(&self) {
        self.peer_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_error(&self) {
        self.peer_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_local_load(&self) {
        self.local_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_local_load_err(&self) {
        self.local_load_errs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the counters into a serializable snapshot, together with the
    /// current size of the group's cache.
    pub fn snapshot(&self, bytes: usize, items: usize) -> CacheStats {
        CacheStats {
            gets: self.gets.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            peer_loads: self.peer_loads.load(Ordering::Relaxed),
            peer_errors: self.peer_errors.load(Ordering::Relaxed),
            local_loads: self.local_loads.load(Ordering::Relaxed),
            local_load_errs: self.local_load_errs.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            bytes,
            items,
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of a group's counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Calls to `Group::get` with a valid key
    pub gets: u64,
    /// Lookups served from the local cache
    pub cache_hits: u64,
    /// Values fetched successfully from a remote peer
    pub peer_loads: u64,
    /// Remote fetches that failed and fell back to the loader
    pub peer_errors: u64,
    /// Successful loader calls
    pub local_loads: u64,
    /// Loader calls that returned an error
    pub local_load_errs: u64,
    /// Entries evicted by the LRU engine
    pub evictions: u64,
    /// Bytes currently held by the cache
    pub bytes: usize,
    /// Entries currently held by the cache
    pub items: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Returns cache_hits / gets, or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.gets as f64
        }
    }
}
