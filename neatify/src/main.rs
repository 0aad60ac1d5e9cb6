//! Main binary entry point for the `Neatify` refactoring tool.
//!
//! This binary delegates to the shared `entry_point::run_with_args()` function
//! so it behaves exactly like the `neatify` binary from neatify-cli.

use anyhow::Result;

fn main() -> Result<()> {
    let code = neatify::entry_point::run_with_args(std::env::args().skip(1).collect())?;
    std::process::exit(code);
}
