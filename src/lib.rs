//! QCache - A distributed in-process cache
//!
//! Each node keeps a byte-bounded LRU cache per named group. Keys are routed
//! to one owning node with consistent hashing; on a miss everywhere the
//! group's loader fills the cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod consistenthash;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;

pub use api::{AppState, HttpPool};
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Getter, GetterFunc, Group, Registry};
pub use peers::{PeerGetter, PeerPicker};
