//! vitrine server entry point.
//!
//! Boots the HTTP API in front of the coalescing search cache.
//! Logs are JSON on stderr.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use vitrine_core::{AppConfig, CacheStore, Coordinator, ServiceRegistry};

mod error;
mod handler;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    let mut registry = ServiceRegistry::new();
    let crawler = vitrine_client::crawler(&config.upstream).context("building MercadoLibre crawler")?;
    registry.register(vitrine_client::SERVICE_NAME, Arc::new(crawler));

    let store = CacheStore::new(&config.cache.dir, config.cache.ttl());
    let coordinator = Coordinator::new(registry, store);
    let app = handler::router(coordinator, config.static_dir.as_deref());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;

    tracing::info!(
        %addr,
        cache_dir = %config.cache.dir.display(),
        ttl_ms = config.cache.ttl_ms,
        "Starting vitrine server"
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
