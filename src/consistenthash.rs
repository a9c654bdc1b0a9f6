//! Consistent Hash Module
//!
//! Maps keys onto a ring of virtual nodes so that each key has one owning peer.

use std::collections::HashMap;

/// Hash function used to place peers and keys on the ring.
pub type Hash = fn(&[u8]) -> u32;

// == Map ==
/// Consistent hash ring with `replicas` virtual nodes per real peer.
///
/// Peers are expected to be added once, before lookups start; adding the
/// same peer twice duplicates its virtual nodes.
#[derive(Debug, Clone)]
pub struct Map {
    hash: Hash,
    replicas: usize,
    /// Virtual node hashes, ascending
    keys: Vec<u32>,
    /// Virtual node hash to real peer
    hash_map: HashMap<u32, String>,
}

impl Map {
    // == Constructor ==
    /// Creates an empty ring. Uses CRC-32 (IEEE) when `hash` is `None`.
    pub fn new(replicas: usize, hash: Option<Hash>) -> Self {
        Self {
            hash: hash.unwrap_or(crc32fast::hash),
            replicas,
            keys: Vec::new(),
            hash_map: HashMap::new(),
        }
    }

    // == Add ==
    /// Places `replicas` virtual nodes on the ring for every peer.
    ///
    /// Virtual node `i` of peer `p` sits at `hash(format!("{i}{p}"))`.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let hash = (self.hash)(format!("{i}{peer}").as_bytes());
                self.keys.push(hash);
                self.hash_map.insert(hash, peer.to_string());
            }
        }
        self.keys.sort_unstable();
    }

    // == Get ==
    /// Returns the peer owning `key`: the first virtual node at or after the
    /// key's hash, wrapping around to the start of the ring.
    ///
    /// Returns `None` when the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&k| k < hash);
        let point = self.keys[idx % self.keys.len()];
        self.hash_map.get(&point).map(String::as_str)
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    /// Hashes "N" to N so ring positions can be read off directly.
    fn numeric_hash(data: &[u8]) -> u32 {
        std::str::from_utf8(data)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    #[test]
    fn test_hashing() {
        let mut ring = Map::new(3, Some(numeric_hash));

        // 2, 12, 22 / 4, 14, 24 / 6, 16, 26
        ring.add(["6", "4", "2"]);
        assert_eq!(ring.len(), 9);

        let mut cases = vec![("2", "2"), ("11", "2"), ("23", "4"), ("27", "2")];
        for (key, peer) in &cases {
            assert_eq!(ring.get(key), Some(*peer), "asking for {key}");
        }

        // 8, 18, 28
        ring.add(["8"]);
        cases[3] = ("27", "8");
        for (key, peer) in &cases {
            assert_eq!(ring.get(key), Some(*peer), "asking for {key}");
        }
    }

    #[test]
    fn test_empty_ring() {
        let ring = Map::new(3, None);
        assert!(ring.is_empty());
        assert_eq!(ring.get("anything"), None);
    }

    #[test]
    fn test_exact_hit_belongs_to_that_point() {
        let mut ring = Map::new(1, Some(numeric_hash));
        ring.add(["10", "20"]);

        // Virtual points: "010" -> 10, "020" -> 20
        assert_eq!(ring.get("10"), Some("10"));
        assert_eq!(ring.get("11"), Some("20"));
        assert_eq!(ring.get("21"), Some("10"));
    }

    #[test]
    fn test_default_hash_is_crc32_ieee() {
        // Virtual node 1 of peer "23456789" sits at hash("123456789"), the
        // standard CRC-32/IEEE check input.
        let mut ring = Map::new(2, None);
        ring.add(["23456789"]);

        assert!(ring.keys.contains(&0xCBF4_3926));
        assert_eq!(ring.get("123456789"), Some("23456789"));
    }

    #[test]
    fn test_default_hash_is_deterministic() {
        let peers = ["http://localhost:8001", "http://localhost:8002", "http://localhost:8003"];
        let mut a = Map::new(50, None);
        let mut b = Map::new(50, None);
        a.add(peers);
        b.add(peers.iter().rev());

        for i in 0..200 {
            let key = format!("key-{i}");
            assert_eq!(a.get(&key), b.get(&key));
        }
    }

    #[test]
    fn test_default_hash_spreads_keys() {
        let peers = ["http://localhost:8001", "http://localhost:8002", "http://localhost:8003"];
        let mut ring = Map::new(50, None);
        ring.add(peers);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for i in 0..3000 {
            let key = format!("key-{i}");
            *counts.entry(ring.get(&key).unwrap()).or_default() += 1;
        }

        assert_eq!(counts.len(), 3);
        for peer in peers {
            assert!(counts[peer] > 150, "{peer} got {}", counts[peer]);
        }
    }
}
