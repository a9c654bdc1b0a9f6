//! API Handlers
//!
//! HTTP request handlers for the peer endpoint and the client-facing API.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::ByteView;
use crate::error::{CacheError, Result};
use crate::group::Registry;
use crate::models::{ApiQuery, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups served by this node
    pub registry: Arc<Registry>,
    /// Group answered by `GET /api`
    pub api_group: String,
}

impl AppState {
    /// Creates a new AppState over `registry`.
    pub fn new(registry: Arc<Registry>, api_group: impl Into<String>) -> Self {
        Self {
            registry,
            api_group: api_group.into(),
        }
    }
}

/// Raw bytes of a view, sent without any transcoding.
fn octet_stream(view: ByteView) -> Response {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        view.byte_slice(),
    )
        .into_response()
}

/// Handler for GET /_qcache/:group/:key
///
/// Serves another node's request for a key this node owns.
pub async fn peer_handler(
    State(state): State<AppState>,
    Path((group_name, key)): Path<(String, String)>,
) -> Result<Response> {
    let group = state
        .registry
        .get_group(&group_name)
        .ok_or(CacheError::GroupNotFound(group_name))?;

    let view = group.get(&key).await?;
    Ok(octet_stream(view))
}

/// Handler for GET /_qcache/:group/
///
/// A peer URL with an empty key segment.
pub async fn peer_group_handler(
    State(state): State<AppState>,
    Path(group_name): Path<String>,
) -> Result<Response> {
    let group = state
        .registry
        .get_group(&group_name)
        .ok_or(CacheError::GroupNotFound(group_name))?;

    let view = group.get("").await?;
    Ok(octet_stream(view))
}

/// Handler for GET /api?key=...
///
/// Looks the key up in the configured group.
pub async fn api_handler(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
) -> Result<Response> {
    let group = state
        .registry
        .get_group(&state.api_group)
        .ok_or_else(|| CacheError::GroupNotFound(state.api_group.clone()))?;

    let view = group.get(&query.key).await?;
    Ok(octet_stream(view))
}

/// Handler for GET /stats
///
/// Returns the counters of every registered group.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let mut response = StatsResponse::default();
    for name in state.registry.group_names() {
        if let Some(group) = state.registry.get_group(&name) {
            response.insert(name, group.stats());
        }
    }
    Json(response)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GetterFunc;

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

    #[tokio::test]
    async fn test_peer_handler_hit() {
        let state = test_state();

        let response = peer_handler(
            State(state),
            Path(("scores".to_string(), "Tom".to_string())),
        )
        .await
        .unwrap();

        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_peer_handler_unknown_group() {
        let state = test_state();

        let result = peer_handler(
            State(state),
            Path(("nope".to_string(), "Tom".to_string())),
        )
        .await;
        assert!(matches!(result, Err(CacheError::GroupNotFound(name)) if name == "nope"));
    }

    #[tokio::test]
    async fn test_api_handler_empty_key() {
        let state = test_state();

        let result = api_handler(State(state), Query(ApiQuery::default())).await;
        assert!(matches!(result, Err(CacheError::EmptyKey)));
    }

    #[tokio::test]
    async fn test_api_handler_loader_error() {
        let state = test_state();

        let result = api_handler(
            State(state),
            Query(ApiQuery {
                key: "Bob".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(CacheError::Loader(_))));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();
        api_handler(
            State(state.clone()),
            Query(ApiQuery {
                key: "Tom".to_string(),
            }),
        )
        .await
        .unwrap();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.groups["scores"].stats.local_loads, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
