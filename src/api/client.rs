//! HTTP Peer Client
//!
//! Fetches values from another node's peer endpoint.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::peers::PeerGetter;

// == Http Getter ==
/// [`PeerGetter`] that talks to one remote node over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    /// Peer URL plus base path, e.g. `http://localhost:8002/_qcache/`
    base_url: String,
    client: reqwest::Client,
}

impl HttpGetter {
    /// Creates a getter for `base_url`, sharing the given connection pool.
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request URL for `(group, key)`, with both segments percent-encoded.
    pub fn url_for(&self, group: &str, key: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(group),
            urlencoding::encode(key)
        )
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = self.url_for(group, key);
        debug!(%url, "fetching from peer");

        let res = self.client.get(&url).send().await?;
        if !res.status().is_success() {
            return Err(CacheError::Peer(format!(
                "server returned: {}",
                res.status()
            )));
        }

        let body = res.bytes().await?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_encodes_segments() {
        let getter = HttpGetter::new("http://localhost:8002/_qcache/", reqwest::Client::new());

        assert_eq!(
            getter.url_for("scores", "Tom"),
            "http://localhost:8002/_qcache/scores/Tom"
        );
        assert_eq!(
            getter.url_for("my group", "a/b?c"),
            "http://localhost:8002/_qcache/my%20group/a%2Fb%3Fc"
        );
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_a_peer_error() {
        // Port 9 (discard) is not expected to run an HTTP server.
        let getter = HttpGetter::new("http://127.0.0.1:9/_qcache/", reqwest::Client::new());

        let err = getter.get("scores", "Tom").await.unwrap_err();
        assert!(matches!(err, CacheError::Peer(_)));
    }
}
