//! questiongraph-server -- HTTP facade over the question graph store.
//!
//! Exposes node and edge maintenance plus successor lookup as JSON
//! endpoints. All handlers share one [`GraphStore`], which is closed once
//! the listener shuts down.

pub mod cli;
pub mod error;
pub mod http;

use std::net::SocketAddr;

use questiongraph_storage::GraphStore;
use tracing::{info, warn};

/// Serve the router on `bind` until ctrl-c, then close the store.
pub async fn serve(bind: SocketAddr, store: GraphStore) -> anyhow::Result<()> {
    let app = http::router(store.clone());
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(
        "questiongraph-server listening on {} (backend: {})",
        listener.local_addr()?,
        store.backend_name()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing graph store");
    store.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
