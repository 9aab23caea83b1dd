mod bootstrap;
mod health;
mod routes;

use std::future::IntoFuture;
use std::pin::pin;
use std::time::Duration;

use anyhow::Result;
use palmsure_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use palmsure_core::config::LogFormat::*;
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
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    health::spawn(
        &app.config.server.bind_address,
        app.config.server.health_check_port,
        app.mailer.clone(),
    )
    .await?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        transport_mode = app.mailer.transport_mode(),
        "palmsure-server started"
    );

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    let shutdown = std::sync::Arc::new(tokio::sync::Notify::new());
    let notify = shutdown.clone();

    let mut server = pin!(axum::serve(listener, routes::router(app.mailer.clone()))
        .with_graceful_shutdown(async move { notify.notified().await })
        .into_future());

    tokio::select! {
        result = &mut server => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(
                event_name = "system.server.stopping",
                correlation_id = "shutdown",
                "shutdown signal received, draining in-flight requests"
            );
            shutdown.notify_one();
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result?,
                Err(_) => {
                    tracing::warn!(
                        event_name = "system.server.drain_timeout",
                        correlation_id = "shutdown",
                        "graceful shutdown window elapsed before all requests finished"
                    );
                }
            }
        }
    }

    tracing::info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "palmsure-server stopped"
    );

    Ok(())
}
