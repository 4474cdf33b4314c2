//! socket-relay entry point.
//!
//! Binds the TCP relay listener and the HTTP/WebSocket listener, then relays
//! until Ctrl+C.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use socket_relay::config::{LogFormat, RelayConfig};
use socket_relay::server::RelayServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing before config, which may warn. Loads `.env` first.
    let log_format = LogFormat::from_env();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    // Load configuration
    let config = RelayConfig::from_env().context("failed to load configuration")?;

    tracing::info!(
        tcp = %config.tcp_listen_addr,
        http = %config.http_listen_addr,
        "starting socket-relay"
    );

    // Listener failures are fatal; there is no retry.
    let server = RelayServer::bind(config)
        .await
        .context("failed to start listeners")?;

    server
        .run(shutdown_signal())
        .await
        .context("relay stopped with an error")?;

    tracing::info!("socket-relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
}
