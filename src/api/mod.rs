//! API Module
//!
//! HTTP transport between nodes, plus the client-facing lookup API.
//!
//! # Endpoints
//! - `GET /_qcache/:group/:key` - Peer lookup (peer server)
//! - `GET /_qcache/:group/` - Empty key, rejected with 400 (peer server)
//! - `GET /api?key=...` - Client lookup (API server)
//! - `GET /stats` - Per-group statistics
//! - `GET /health` - Health check endpoint

pub mod client;
pub mod handlers;
pub mod pool;
pub mod routes;

pub use client::HttpGetter;
pub use handlers::*;
pub use pool::{HttpPool, DEFAULT_BASE_PATH, DEFAULT_PEER_TIMEOUT, DEFAULT_REPLICAS};
pub use routes::{create_api_router, create_peer_router};
