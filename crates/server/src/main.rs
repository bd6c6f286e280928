//! pagesift server entry point.
//!
//! Boots the MCP server on stdio transport. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use pagesift_core::AppConfig;
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
    let state = handler::AppState::from_config(config).await?;

    tracing::info!(render = state.acquirer.render_available(), "Starting pagesift server on stdio transport");

    let handler = handler::PagesiftServer::new(Arc::new(state));
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
