//! clubwatch server entry point.
//!
//! Boots the MCP server on stdio transport. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use clubwatch_client::{FetchClient, FetchConfig};
use clubwatch_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let db = CacheDb::open(&config.db_path).await?;
    let fetcher = FetchClient::new(FetchConfig::from_app(&config))?;

    tracing::info!(db = %config.db_path.display(), teams = config.teams.len(), "starting clubwatch on stdio transport");

    let handler = handler::ClubwatchServer::new(config, db, fetcher);
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
