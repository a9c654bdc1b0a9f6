//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::api::{DEFAULT_PEER_TIMEOUT, DEFAULT_REPLICAS};

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host name peers use to reach this node
    pub host: String,
    /// Port of the peer server
    pub port: u16,
    /// Whether to also run the client-facing API server
    pub api: bool,
    /// Port of the API server
    pub api_port: u16,
    /// Byte budget of the demo group's cache
    pub cache_bytes: usize,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Base URLs of every node in the cluster, this one included
    pub peers: Vec<String>,
    /// Name of the group served by the API server
    pub group: String,
    /// Per-request timeout for peer fetches, in milliseconds
    pub peer_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `QCACHE_HOST` - Host name of this node (default: localhost)
    /// - `QCACHE_PORT` - Peer server port (default: 8001)
    /// - `QCACHE_API` - Start the API server, `true`/`1` (default: false)
    /// - `QCACHE_API_PORT` - API server port (default: 9999)
    /// - `QCACHE_CACHE_BYTES` - Group cache budget in bytes (default: 2048)
    /// - `QCACHE_REPLICAS` - Virtual nodes per peer (default: 50)
    /// - `QCACHE_PEERS` - Comma separated peer URLs (default: localhost 8001-8003)
    /// - `QCACHE_GROUP` - Group served by the API (default: scores)
    /// - `QCACHE_PEER_TIMEOUT_MS` - Peer request timeout in ms (default: 2000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = env::var("QCACHE_HOST").unwrap_or(defaults.host);

        Self {
            port: parse_var("QCACHE_PORT").unwrap_or(defaults.port),
            api: env::var("QCACHE_API")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.api),
            api_port: parse_var("QCACHE_API_PORT").unwrap_or(defaults.api_port),
            cache_bytes: parse_var("QCACHE_CACHE_BYTES").unwrap_or(defaults.cache_bytes),
            replicas: parse_var("QCACHE_REPLICAS").unwrap_or(defaults.replicas),
            peers: env::var("QCACHE_PEERS")
                .ok()
                .map(|v| parse_peers(&v))
                .filter(|peers| !peers.is_empty())
                .unwrap_or_else(|| default_peers(&host)),
            group: env::var("QCACHE_GROUP").unwrap_or(defaults.group),
            peer_timeout_ms: parse_var("QCACHE_PEER_TIMEOUT_MS")
                .unwrap_or(defaults.peer_timeout_ms),
            host,
        }
    }

    /// URL other nodes use to reach this node's peer server.
    pub fn self_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        let host = "localhost".to_string();
        Self {
            peers: default_peers(&host),
            host,
            port: 8001,
            api: false,
            api_port: 9999,
            cache_bytes: 2 << 10,
            replicas: DEFAULT_REPLICAS,
            group: "scores".to_string(),
            peer_timeout_ms: DEFAULT_PEER_TIMEOUT.as_millis() as u64,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn parse_peers(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| p.trim_end_matches('/').to_string())
        .collect()
}

fn default_peers(host: &str) -> Vec<String> {
    (8001..=8003)
        .map(|port| format!("http://{host}:{port}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.port, 8001);
        assert!(!config.api);
        assert_eq!(config.api_port, 9999);
        assert_eq!(config.cache_bytes, 2048);
        assert_eq!(config.replicas, 50);
        assert_eq!(config.group, "scores");
        assert_eq!(config.peer_timeout(), Duration::from_secs(2));
        assert_eq!(config.self_url(), "http://localhost:8001");
        assert_eq!(
            config.peers,
            vec![
                "http://localhost:8001",
                "http://localhost:8002",
                "http://localhost:8003"
            ]
        );
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for name in [
            "QCACHE_HOST",
            "QCACHE_PORT",
            "QCACHE_API",
            "QCACHE_API_PORT",
            "QCACHE_CACHE_BYTES",
            "QCACHE_REPLICAS",
            "QCACHE_PEERS",
            "QCACHE_GROUP",
            "QCACHE_PEER_TIMEOUT_MS",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.port, 8001);
        assert_eq!(config.cache_bytes, 2048);
        assert_eq!(config.peer_timeout_ms, 2000);
        assert_eq!(config.peers.len(), 3);
        assert!(config.peers.contains(&config.self_url()));
    }

    #[test]
    fn test_parse_peers() {
        assert_eq!(
            parse_peers(" http://a:1/, ,http://b:2 "),
            vec!["http://a:1", "http://b:2"]
        );
        assert!(parse_peers("").is_empty());
    }
}
