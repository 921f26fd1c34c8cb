//! HTTP server

use anyhow::{Context, Result};
use log::info;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use super::routes::create_router;
use crate::config::ServiceConfig;
use crate::jobs::JobManager;

/// Serve the API until Ctrl-C
pub async fn serve(config: &ServiceConfig, manager: JobManager) -> Result<()> {
    let addr: SocketAddr = config.bind_addr();
    let static_dir = config.static_dir();
    if !static_dir.is_dir() {
        info!(
            "Frontend directory {} not found, serving API only",
            static_dir.display()
        );
    }

    let app = create_router(manager, Some(static_dir));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {addr}"))?;

    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            // If the signal handler cannot be installed, run until killed.
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
            info!("HTTP server shutting down");
        })
        .await
        .context("HTTP server error")?;

    Ok(())
}
