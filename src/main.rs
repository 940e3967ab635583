//! DocuHub Gateway
//!
//! An HTTP gateway between the DocuHub browser frontend and the remote
//! DocuHub REST backend, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                 GATEWAY                      │
//!                    │                                              │
//!  Browser Request   │  ┌─────────┐   ┌───────────┐   ┌──────────┐ │
//!  ──────────────────┼─▶│  http   │──▶│credentials│──▶│translate │ │
//!                    │  │ server  │   └───────────┘   └────┬─────┘ │
//!                    │  └─────────┘                        │       │
//!                    │                                     ▼       │
//!  Browser Response  │  ┌─────────┐   ┌───────────┐   ┌──────────┐ │      DocuHub
//!  ◀─────────────────┼──│  CORS   │◀──│  relay    │◀──│  invoke  │◀┼────  REST
//!                    │  │ headers │   │ envelope  │   │ timeout  │ │      backend
//!                    │  └─────────┘   └───────────┘   └──────────┘ │
//!                    │                                              │
//!                    │  ┌────────────────────────────────────────┐  │
//!                    │  │   config · observability · lifecycle   │  │
//!                    │  └────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docuhub_gateway::config::loader;
use docuhub_gateway::http::HttpServer;
use docuhub_gateway::lifecycle::Shutdown;
use docuhub_gateway::observability::metrics;

#[derive(Parser)]
#[command(name = "docuhub-gateway")]
#[command(about = "HTTP gateway for the DocuHub paper-review backend", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults and environment
    /// variables are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docuhub_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("docuhub-gateway v0.1.0 starting");

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => loader::from_env()?,
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        read_timeout_secs = config.timeouts.read_secs,
        write_timeout_secs = config.timeouts.write_secs,
        "Configuration loaded"
    );
    if config.upstream.base_url.is_empty() {
        tracing::warn!(
            "{} is not set; proxied requests will fail until it is configured",
            loader::ENV_UPSTREAM_URL
        );
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
