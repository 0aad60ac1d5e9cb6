//! Neatify MCP server library.
//!
//! Exposes the refactoring engine as MCP tools so LLM clients can clean up
//! JavaScript/TypeScript snippets without touching the filesystem.

pub mod tools;

pub use tools::NeatifyServer;

use anyhow::Result;
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};

/// Serve MCP over stdio until the client disconnects.
///
/// Configuration is discovered from the working directory.
///
/// # Errors
///
/// Returns an error if the transport fails.
pub async fn run_stdio_server() -> Result<()> {
    let server = NeatifyServer::from_config(&neatify::config::Config::load());
    let service = server.serve((stdin(), stdout())).await?;
    service.waiting().await?;
    Ok(())
}
