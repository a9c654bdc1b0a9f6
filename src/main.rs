//! QCache node
//!
//! Runs one cache node: the peer server, and optionally the client-facing API server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qcache::api::{create_api_router, create_peer_router, AppState, HttpPool};
use qcache::{Config, GetterFunc, Group, Registry};

/// Main entry point for a QCache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the demo group backed by a slow in-memory database
/// 4. Register the HTTP peer pool with the group
/// 5. Optionally start the API server
/// 6. Start the peer server and wait for a shutdown signal
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: node={}, peers={:?}, cache_bytes={}, replicas={}",
        config.self_url(),
        config.peers,
        config.cache_bytes,
        config.replicas
    );

    let registry = Arc::new(Registry::new());
    let group = create_group(&registry, &config);

    let pool = HttpPool::new(config.self_url())
        .with_replicas(config.replicas)
        .with_timeout(config.peer_timeout());
    pool.set(&config.peers);
    group.register_peers(Arc::new(pool))?;

    let state = AppState::new(Arc::clone(&registry), config.group.clone());

    let api_handle = if config.api {
        Some(spawn_api_server(state.clone(), config.api_port).await?)
    } else {
        None
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind peer server on {addr}"))?;
    info!("QCache is running at {}", config.self_url());

    axum::serve(listener, create_peer_router(state))
        .with_graceful_shutdown(shutdown_signal(api_handle))
        .await
        .context("peer server failed")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Builds the demo group over a small in-memory "slow database".
fn create_group(registry: &Registry, config: &Config) -> Arc<Group> {
    let db: HashMap<&'static str, &'static str> =
        [("Tom", "630"), ("Jack", "589"), ("Sam", "567")]
            .into_iter()
            .collect();

    registry.new_group(
        config.group.clone(),
        config.cache_bytes,
        GetterFunc::new(move |key: &str| {
            info!("[SlowDB] search key {}", key);
            db.get(key)
                .map(|v| v.as_bytes().to_vec())
                .ok_or_else(|| format!("{key} not exist").into())
        }),
    )
}

async fn spawn_api_server(state: AppState, port: u16) -> anyhow::Result<JoinHandle<()>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind API server on {addr}"))?;
    info!("API server is running at http://{}", addr);

    Ok(tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, create_api_router(state)).await {
            warn!(error = %err, "API server stopped");
        }
    }))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the API server and lets the peer server drain.
async fn shutdown_signal(api_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = api_handle {
        handle.abort();
        warn!("API server aborted");
    }
}
