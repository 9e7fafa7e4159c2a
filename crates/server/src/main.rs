use anyhow::Context;
use clap::Parser;
use readaloud_core::{Pipeline, Readability};
use readaloud_server::{AppState, ServerConfig, router};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("readaloud=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::parse();

    let pipeline =
        Pipeline::http(config.fetch_config(), Readability::new()).context("Failed to build HTTP client")?;
    let app = router(AppState::new(pipeline, config.request_timeout()));

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;

    tracing::info!(addr = %config.addr, fetch_timeout = config.fetch_timeout, "readaloud server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
