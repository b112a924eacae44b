//! Assessor Live server binary.
//!
//! Loads configuration from the environment, initializes logging and serves
//! the realtime router until Ctrl+C.

use std::sync::Arc;

use assessor_live::adapters::http::app_router;
use assessor_live::adapters::websocket::ChannelManager;
use assessor_live::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let addr = config.server.socket_addr()?;
    let channel_manager = Arc::new(ChannelManager::new());
    let app = app_router(&config, channel_manager);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        address = %addr,
        ws_path = %config.realtime.ws_path,
        environment = ?config.server.environment,
        "Realtime server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down");
    Ok(())
}

/// `RUST_LOG` wins over the configured filter; JSON output in production.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if config.is_production() {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
