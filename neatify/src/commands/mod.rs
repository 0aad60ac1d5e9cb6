//! Commands module - CLI subcommand implementations.

mod fix;
mod init;
mod summary;

pub use fix::{run_fix, FileOutcome, FixMode, FixOptions};
pub use init::{run_init, run_init_in, DEFAULT_CONFIG};
pub use summary::run_summary;
