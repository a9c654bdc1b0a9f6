//! Group Module
//!
//! A group is a named cache namespace with its own byte budget and loader.
//! Lookups go through three tiers:
//!
//! ```text
//!   get(key) ──► local cache ── hit ──► return
//!                    │ miss
//!                    ▼
//!              owning peer? ── yes ──► fetch remote ── ok ──► return (not cached here)
//!                    │ no                   │ err
//!                    ▼                      ▼
//!              loader(key) ◄────────────────┘
//!                    │ ok                   │ err
//!                    ▼                      ▼
//!           populate cache, return     return loader error
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{ByteView, CacheStats, CacheStore, GroupStats};
use crate::error::{BoxError, CacheError, Result};
use crate::peers::{PeerGetter, PeerPicker};

// == Getter ==
/// Loads a value from the slow source when no cache or peer has it.
///
/// Called concurrently from many requests, so implementations must be `Sync`.
/// Implementations must not block the runtime; wrap blocking loaders in
/// [`GetterFunc`].
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> std::result::Result<Vec<u8>, BoxError>;
}

/// Adapts a plain (possibly blocking) closure into a [`Getter`].
///
/// Each call runs on tokio's blocking pool.
pub struct GetterFunc<F>(Arc<F>);

impl<F> GetterFunc<F>
where
    F: Fn(&str) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self(Arc::new(f))
    }
}

#[async_trait]
impl<F> Getter for GetterFunc<F>
where
    F: Fn(&str) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> std::result::Result<Vec<u8>, BoxError> {
        let f = Arc::clone(&self.0);
        let key = key.to_string();
        tokio::task::spawn_blocking(move || f(&key)).await?
    }
}

// == Group ==
/// A cache namespace: one LRU store, one loader, and optionally a peer picker.
pub struct Group {
    name: String,
    getter: Box<dyn Getter>,
    main_cache: CacheStore,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    stats: Arc<GroupStats>,
}

impl Group {
    fn new(name: String, cache_bytes: usize, getter: Box<dyn Getter>) -> Self {
        let stats = Arc::new(GroupStats::new());
        Self {
            name,
            getter,
            main_cache: CacheStore::new(cache_bytes, Arc::clone(&stats)),
            peers: OnceLock::new(),
            stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Installs the peer picker. A group accepts exactly one picker; a second
    /// call is a configuration error.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers
            .set(peers)
            .map_err(|_| CacheError::PeersAlreadyRegistered(self.name.clone()))
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a miss.
    ///
    /// Fails only for an empty key or when the loader itself fails; peer
    /// failures fall back to the loader.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }

        self.stats.record_get();
        if let Some(value) = self.main_cache.get(key) {
            self.stats.record_hit();
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.load(key).await
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        if let Some(peer) = self.peers.get().and_then(|picker| picker.pick_peer(key)) {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => {
                    self.stats.record_peer_load();
                    return Ok(value);
                }
                Err(err) => {
                    self.stats.record_peer_error();
                    warn!(group = %self.name, key, error = %err, "failed to get from peer");
                }
            }
        }

        self.get_locally(key).await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let bytes = peer.get(&self.name, key).await?;
        Ok(ByteView::new(bytes))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = self.getter.get(key).await.map_err(|err| {
            self.stats.record_local_load_err();
            CacheError::loader(err)
        })?;
        self.stats.record_local_load();
        info!(group = %self.name, key, bytes = bytes.len(), "loaded locally");

        let value = ByteView::new(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.set(key, value);
    }

    // == Stats ==
    /// Snapshot of this group's counters and cache size.
    pub fn stats(&self) -> CacheStats {
        self.stats
            .snapshot(self.main_cache.bytes(), self.main_cache.items())
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("main_cache", &self.main_cache)
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}

// == Registry ==
/// Name-to-group map shared by everything in one process.
///
/// Built once at startup and passed by handle; tests build their own.
#[derive(Debug, Default)]
pub struct Registry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // == New Group ==
    /// Creates a group and registers it under `name`, replacing any group
    /// already registered with that name.
    ///
    /// # Arguments
    /// * `name` - Namespace name
    /// * `cache_bytes` - Byte budget of the group's cache, 0 for unbounded
    /// * `getter` - Loader for keys missing from every cache
    pub fn new_group<G>(&self, name: impl Into<String>, cache_bytes: usize, getter: G) -> Arc<Group>
    where
        G: Getter + 'static,
    {
        let name = name.into();
        let group = Arc::new(Group::new(name.clone(), cache_bytes, Box::new(getter)));
        self.groups.write().insert(name, Arc::clone(&group));
        group
    }

    // == Get Group ==
    /// Looks up a group by name. Never creates one.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// Names of all registered groups, sorted.
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }
}
