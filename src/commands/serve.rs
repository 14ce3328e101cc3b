//! The `serve` command: run the HTTP API server

use anyhow::{Context, Result};

use crate::config::Config;
use crate::metrics;
use crate::server::{ServerConfig, TrendServer};

/// Start the trendlens server and run until ctrl-c
pub async fn serve(bind: Option<String>, debug_routes: bool) -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    let mut server_config = ServerConfig::from_env().context("invalid server configuration")?;
    if let Some(addr) = bind {
        server_config = ServerConfig::builder()
            .bind_address_str(&addr)
            .context("invalid bind address")?
            .enable_cors(server_config.enable_cors)
            .enable_request_logging(server_config.enable_request_logging)
            .enable_debug_routes(server_config.enable_debug_routes)
            .build()
            .context("invalid server configuration")?;
    }
    if debug_routes {
        server_config.enable_debug_routes = true;
    }

    if let Err(e) = metrics::init_metrics() {
        tracing::warn!("metrics initialization failed: {e}");
    }

    let server = TrendServer::connect(config, server_config)
        .await
        .context("failed to start server")?;

    println!("{}", server.info().display());

    server
        .start_with_shutdown(shutdown_signal())
        .await
        .context("server terminated with an error")?;

    Ok(())
}

/// Resolve when the process receives ctrl-c
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
    tracing::info!("shutdown signal received");
}
