//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error type produced by user-supplied loaders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// `Group::get` was called with an empty key
    #[error("key is required")]
    EmptyKey,

    /// No group is registered under this name
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// The loader could not resolve the key; the loader's message is kept verbatim
    #[error("{0}")]
    Loader(BoxError),

    /// A remote peer failed to serve the request
    #[error("peer error: {0}")]
    Peer(String),

    /// `register_peers` was called more than once on the same group
    #[error("peers already registered for group {0}")]
    PeersAlreadyRegistered(String),
}

impl CacheError {
    /// Wraps any loader error, keeping its message untouched.
    pub fn loader<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        CacheError::Loader(err.into())
    }
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Peer(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::EmptyKey => StatusCode::BAD_REQUEST,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Peer(_) => StatusCode::BAD_GATEWAY,
            CacheError::Loader(_) | CacheError::PeersAlreadyRegistered(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
