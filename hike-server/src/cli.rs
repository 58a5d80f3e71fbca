use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hike_core::{Config, provider_from_config};
use tracing::{info, warn};

use crate::app::{AppState, build_router};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "hike-server", version, about = "Rates forecast days for hiking")]
pub struct Cli {
    /// Interface to bind, e.g. 0.0.0.0 to accept requests from the network.
    #[arg(long, env = "HIKE_HOST")]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(long, env = "HIKE_PORT")]
    pub port: Option<u16>,

    /// Config file; defaults to the platform config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Config file, then environment, then command-line flags.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        config.apply_env();

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        Ok(config)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.load_config()?;
        let provider = provider_from_config(&config)?;
        let app = build_router(AppState { provider });

        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        info!(%addr, "hike forecast server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server terminated with an error")?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
