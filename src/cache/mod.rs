//! Cache Module
//!
//! Provides the byte-bounded LRU engine, the immutable value type it stores,
//! and the locked per-group wrapper around it.

mod byteview;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use byteview::ByteView;
pub use lru::{Lru, OnEvicted, Value};
pub use stats::{CacheStats, GroupStats};
pub use store::CacheStore;
