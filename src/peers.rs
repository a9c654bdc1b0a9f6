//! Peer Module
//!
//! Capabilities a group needs to reach other nodes: picking the owner of a
//! key, and fetching a value from that owner.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

// == Peer Picker ==
/// Chooses the remote peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the owning peer, or `None` when the key should be served locally.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

// == Peer Getter ==
/// Fetches a value for `(group, key)` from one remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>>;
}

/// Picker for a node that runs without peers; every key is local.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPeers;

impl PeerPicker for NoPeers {
    fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
        None
    }
}
