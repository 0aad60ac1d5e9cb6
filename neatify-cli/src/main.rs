//! Command-line interface entry point for `Neatify`.

use anyhow::Result;
use neatify::entry_point;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().is_some_and(|a| a == "mcp-server") {
        entry_point::init_tracing();
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(neatify_mcp::run_stdio_server())?;
        return Ok(());
    }

    // Delegate CLI args to shared entry_point function
    let code = entry_point::run_with_args(args)?;
    std::process::exit(code);
}
