//! Binary crate for the `hike-server` HTTP service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and assembling configuration
//! - Logging setup
//! - The `/get_hike_forecast` endpoint and its JSON contract

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod error;

const DEFAULT_LOG_FILTER: &str = "hike_server=info,hike_core=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
