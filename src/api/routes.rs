//! API Routes
//!
//! Configures the Axum routers for the peer server and the API server.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    api_handler, health_handler, peer_group_handler, peer_handler, stats_handler, AppState,
};
use super::pool::DEFAULT_BASE_PATH;

/// Creates the router other nodes talk to.
///
/// # Endpoints
/// - `GET /_qcache/:group/:key` - Raw value bytes for a key owned by this node
/// - `GET /_qcache/:group/` - Empty key, rejected with 400
/// - `GET /stats` - Per-group statistics
/// - `GET /health` - Health check endpoint
pub fn create_peer_router(state: AppState) -> Router {
    Router::new()
        .route(&format!("{DEFAULT_BASE_PATH}:group/:key"), get(peer_handler))
        .route(&format!("{DEFAULT_BASE_PATH}:group/"), get(peer_group_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Creates the client-facing router.
///
/// # Endpoints
/// - `GET /api?key=...` - Raw value bytes from the configured group
/// - `GET /stats` - Per-group statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_api_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(api_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{GetterFunc, Registry};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn test_state() -> AppState {
        let registry = Arc::new(Registry::new());
        registry.new_group(
            "scores",
            0,
            GetterFunc::new(|key: &str| match key {
                "Tom" => Ok(b"630".to_vec()),
                _ => Err(format!("{key} not exist").into()),
            }),
        );
        AppState::new(registry, "scores")
    }

    async fn status_of(app: Router, uri: &str) -> StatusCode {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_peer_route() {
        let app = create_peer_router(test_state());
        assert_eq!(status_of(app.clone(), "/_qcache/scores/Tom").await, StatusCode::OK);
        assert_eq!(
            status_of(app.clone(), "/_qcache/missing/Tom").await,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(app, "/_qcache/scores/Bob").await,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_peer_route_empty_key() {
        let app = create_peer_router(test_state());
        assert_eq!(
            status_of(app.clone(), "/_qcache/scores/").await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(app, "/_qcache/missing/").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_api_route() {
        let app = create_api_router(test_state());
        assert_eq!(status_of(app.clone(), "/api?key=Tom").await, StatusCode::OK);
        assert_eq!(status_of(app, "/api").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_api_router(test_state());
        assert_eq!(status_of(app, "/health").await, StatusCode::OK);
    }
}
