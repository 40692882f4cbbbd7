mod bootstrap;
mod health;
mod ui;

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use shelfrec_core::config::{AppConfig, LoadOptions};
use shelfrec_core::RecommendationEngine;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) {
    use shelfrec_core::config::LogFormat::*;

    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_target(false).with_env_filter(filter);

    match config.logging.format {
        Compact => builder.compact().init(),
        Pretty => builder.pretty().init(),
        Json => builder.json().init(),
    }
}

fn app_router(engine: Arc<RecommendationEngine>) -> Router {
    ui::router(engine.clone())
        .merge(health::router(engine))
        .nest_service("/static", ServeDir::new("static"))
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config =
        AppConfig::load(LoadOptions::default()).map_err(bootstrap::BootstrapError::from)?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;
    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("could not bind `{address}`"))?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "shelfrec-server listening"
    );

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    axum::serve(listener, app_router(app.engine.clone()))
        .with_graceful_shutdown(wait_for_shutdown(tokio::signal::ctrl_c(), grace))
        .await?;

    tracing::info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "shelfrec-server stopped"
    );

    Ok(())
}

/// Resolves once `signal` fires; a second grace period bounds in-flight requests.
/// If the signal cannot be observed the server keeps running.
async fn wait_for_shutdown(signal: impl Future<Output = io::Result<()>>, grace: Duration) {
    if let Err(error) = signal.await {
        tracing::error!(
            event_name = "system.server.signal_error",
            correlation_id = "shutdown",
            error = %error,
            "could not listen for shutdown signal, serving until the process is stopped"
        );
        std::future::pending::<()>().await;
    }

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        grace_secs = grace.as_secs(),
        "shutdown requested, draining in-flight requests"
    );
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        tracing::warn!(
            event_name = "system.server.forced_exit",
            correlation_id = "shutdown",
            "graceful shutdown window elapsed, exiting"
        );
        std::process::exit(0);
    });
}
