use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

pub fn init_env() {
    dotenvy::dotenv().ok();
}

/// Binds the listener and serves the router until the process is stopped.
pub async fn serve(service_name: &str, app: Router, config: &Config) -> Result<()> {
    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("{service_name} listening on {addr}");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
