mod bootstrap;
mod health;
pub mod routes;

use std::time::Duration;

use anyhow::Result;
use compass_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use compass_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        app.db_pool.clone(),
        app.engine.scorer_loaded(),
    )
    .await?;

    tracing::info!(
        event_name = "system.server.scorer_mode",
        correlation_id = "bootstrap",
        scorer = if app.engine.scorer_loaded() { "loaded" } else { "unloaded" },
        "leadership scorer availability resolved"
    );

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "compass-server started"
    );

    let state = routes::ApiState::new(app.engine.clone(), app.directory.clone());
    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "compass-server stopping"
    );
    let close = app.db_pool.close();
    let _ = tokio::time::timeout(
        Duration::from_secs(app.config.server.graceful_shutdown_secs.max(1)),
        close,
    )
    .await;

    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
