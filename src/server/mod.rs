//! HTTP server for the browser UI.
//!
//! Axum-based server serving the page, the synthesis endpoint and clip downloads.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub mod handlers;
mod page;
pub mod routes;
pub mod state;

#[cfg(test)]
mod tests;

pub use state::AppState;

/// Serve the UI on `addr` until `shutdown` is cancelled.
pub async fn start_server(addr: &str, state: AppState, shutdown: CancellationToken) -> Result<()> {
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("Failed to bind {}", addr))?;
    info!("🌐 Kokoro Studio ready at http://{}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown.cancelled_owned()).await.context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}
