//! Logistics Operator Gateway
//!
//! A thin HTTP entry point for the logistics platform, built with Tokio and
//! Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                OPERATOR GATEWAY                   │
//!                    │                                                   │
//!  Operator Request  │  ┌──────────┐   ┌──────────┐   ┌──────────────┐  │
//!  ──────────────────┼─▶│ request  │──▶│ gateway  │──▶│   upstream   │──┼──▶ config /
//!                    │  │ id layer │   │forwarder │   │  HTTP client │  │    shipping /
//!                    │  └──────────┘   └──────────┘   └──────────────┘  │    stock svc
//!                    │                                                   │
//!                    │  ┌─────────────────────────────────────────────┐ │
//!                    │  │            Cross-Cutting Concerns            │ │
//!                    │  │  ┌────────┐ ┌────────┐ ┌────────────────┐   │ │
//!                    │  │  │ config │ │ health │ │ observability  │   │ │
//!                    │  │  └────────┘ └────────┘ └────────────────┘   │ │
//!                    │  │  ┌──────────────────────┐ ┌─────────────┐   │ │
//!                    │  │  │ stock client         │ │  lifecycle  │   │ │
//!                    │  │  │ retry / breaker /    │ │  shutdown   │   │ │
//!                    │  │  │ cache                │ │             │   │ │
//!                    │  │  └──────────────────────┘ └─────────────┘   │ │
//!                    │  └─────────────────────────────────────────────┘ │
//!                    └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use tokio::net::TcpListener;

use logistics_gateway::config::loader::load_config;
use logistics_gateway::lifecycle::{wait_for_signal, Shutdown};
use logistics_gateway::observability::{logging, metrics};
use logistics_gateway::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("GATEWAY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("gateway.toml"));

    // Out-of-bounds resilience parameters or missing required fields are
    // fatal: the gateway must not accept traffic with an invalid config.
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("logistics-gateway: configuration rejected: {e}");
            std::process::exit(1);
        }
    };

    logging::init(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logistics-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstreams = config.upstreams.len(),
        environment = %config.environment,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;

    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
