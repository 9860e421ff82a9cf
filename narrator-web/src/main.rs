//! Binary crate for the `narrator` weather front end.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Serving narrative pages over HTTP
//! - Human-friendly terminal output

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod page;
mod server;

const DEFAULT_LOG_FILTER: &str = "narrator=info,narrator_core=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
