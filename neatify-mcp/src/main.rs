//! Neatify MCP Server
//!
//! This binary exposes Neatify's refactoring rules as MCP tools,
//! allowing LLMs like Claude to clean up JavaScript and TypeScript code.

use anyhow::Result;

/// Main entry point for the MCP server.
///
/// Starts the server using stdio transport, which is the standard way
/// for MCP clients like Claude Desktop to communicate with servers.
#[tokio::main]
async fn main() -> Result<()> {
    neatify::entry_point::init_tracing();
    neatify_mcp::run_stdio_server().await
}
