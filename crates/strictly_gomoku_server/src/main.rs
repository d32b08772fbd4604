//! Strictly Gomoku server binary.

use anyhow::{Context, Result};
use clap::Parser;
use strictly_gomoku_server::{Cli, Server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,strictly_gomoku=debug,strictly_gomoku_server=debug")
        }))
        .init();

    let config = Cli::parse().into_config().context("Invalid configuration")?;

    info!(addr = %config.listen_addr(), "Starting Strictly Gomoku server");
    let server = Server::bind(config).await.context("Server failed to start")?;
    info!(addr = ?server.local_addr().ok(), "Server ready");

    server.run().await;
    Ok(())
}
