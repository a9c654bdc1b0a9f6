//! HTTP Peer Pool
//!
//! Routes keys to their owning node with a consistent hash ring and hands
//! back an HTTP client for that node.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::api::client::HttpGetter;
use crate::consistenthash;
use crate::peers::{PeerGetter, PeerPicker};

/// Path prefix under which nodes serve each other.
pub const DEFAULT_BASE_PATH: &str = "/_qcache/";

/// Virtual nodes per peer on the hash ring.
pub const DEFAULT_REPLICAS: usize = 50;

/// Upper bound on a single peer request, connect included.
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
struct PoolState {
    ring: consistenthash::Map,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == Http Pool ==
/// [`PeerPicker`] over a set of HTTP peers, one of which is this node.
#[derive(Debug)]
pub struct HttpPool {
    /// This node's own URL, e.g. `http://localhost:8001`
    self_url: String,
    base_path: String,
    replicas: usize,
    client: reqwest::Client,
    state: Mutex<PoolState>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates a pool for the node reachable at `self_url`, with no peers yet.
    pub fn new(self_url: impl Into<String>) -> Self {
        Self {
            self_url: self_url.into(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            client: build_client(DEFAULT_PEER_TIMEOUT),
            state: Mutex::new(PoolState {
                ring: consistenthash::Map::new(DEFAULT_REPLICAS, None),
                getters: HashMap::new(),
            }),
        }
    }

    /// Overrides the number of virtual nodes per peer used by the next `set`.
    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self
    }

    /// Overrides the per-request peer timeout. Applies to getters built by
    /// the next `set`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    // == Set ==
    /// Replaces the peer set. Every node in the cluster, this one included,
    /// should be listed so all nodes build the same ring.
    pub fn set<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers.into_iter().map(|p| p.as_ref().to_string()).collect();

        let mut ring = consistenthash::Map::new(self.replicas, None);
        ring.add(&peers);

        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(
                    format!("{}{}", peer, self.base_path),
                    self.client.clone(),
                );
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.state.lock() = PoolState { ring, getters };
        info!(node = %self.self_url, peers = ?peers, "peer set updated");
    }
}

fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .unwrap_or_else(|err| {
            warn!(error = %err, "failed to build peer client, using defaults");
            reqwest::Client::new()
        })
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.lock();
        let peer = state.ring.get(key)?;
        if peer == self.self_url {
            return None;
        }

        debug!(node = %self.self_url, peer, key, "picked peer");
        let getter = state.getters.get(peer)?;
        Some(Arc::clone(getter) as Arc<dyn PeerGetter>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEERS: [&str; 3] = [
        "http://localhost:8001",
        "http://localhost:8002",
        "http://localhost:8003",
    ];

    #[test]
    fn test_no_peers_means_local() {
        let pool = HttpPool::new(PEERS[0]);
        assert!(pool.pick_peer("Tom").is_none());
    }

    #[test]
    fn test_single_node_is_always_local() {
        let pool = HttpPool::new(PEERS[0]);
        pool.set([PEERS[0]]);

        for i in 0..50 {
            assert!(pool.pick_peer(&format!("key-{i}")).is_none());
        }
    }

    #[test]
    fn test_pick_peer_excludes_self_and_agrees_across_nodes() {
        let pools: Vec<HttpPool> = PEERS
            .iter()
            .map(|url| {
                let pool = HttpPool::new(*url);
                pool.set(PEERS);
                pool
            })
            .collect();

        let mut remote_picks = 0;
        for i in 0..100 {
            let key = format!("key-{i}");
            // Exactly one node treats the key as local: its owner.
            let local: Vec<_> = pools
                .iter()
                .filter(|pool| pool.pick_peer(&key).is_none())
                .collect();
            assert_eq!(local.len(), 1, "key {key}");
            remote_picks += pools.len() - local.len();
        }
        assert_eq!(remote_picks, 200);
    }

    #[test]
    fn test_set_replaces_previous_peers() {
        let pool = HttpPool::new(PEERS[0]).with_replicas(10);
        pool.set([PEERS[1]]);
        assert!(pool.pick_peer("Tom").is_some());

        pool.set([PEERS[0]]);
        assert!(pool.pick_peer("Tom").is_none());
        assert_eq!(pool.state.lock().ring.len(), 10);
    }

    #[test]
    fn test_getters_carry_base_path() {
        let pool = HttpPool::new(PEERS[0]);
        pool.set(PEERS);

        let state = pool.state.lock();
        assert_eq!(
            state.getters[PEERS[2]].base_url(),
            "http://localhost:8003/_qcache/"
        );
        assert_eq!(pool.base_path(), DEFAULT_BASE_PATH);
        assert_eq!(pool.self_url(), PEERS[0]);
    }
}
