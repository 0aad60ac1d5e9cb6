use crate::constants::CONFIG_FILENAME;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Default configuration written by `neatify init`.
pub const DEFAULT_CONFIG: &str = r#"
[neatify]
# Rules run by `neatify all`, in order
rules = [
    "remove-unused-imports",
    "remove-unused-variables",
    "normalize-casing",
    "modernize-bindings",
]

# Names that are never removed or renamed
ignore_names = []
# ignore_pattern = "^_"     # Regex of names to leave alone

keep_exported = true        # Leave exported declarations alone
verify = true               # Reject rewrites that add syntax errors

# Path filters (added to node_modules, dist, build, ...)
exclude_folders = []
"#;

/// Executes the init command in the current directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined or the file cannot be written.
pub fn run_init<W: Write>(writer: &mut W) -> Result<()> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    run_init_in(&current_dir, writer)
}

/// Executes the init command in a specific directory.
///
/// This is primarily used for testing.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn run_init_in<W: Write>(root: &Path, writer: &mut W) -> Result<()> {
    writeln!(writer, "Initializing Neatify configuration...")?;

    let config_path = root.join(CONFIG_FILENAME);
    if config_path.exists() {
        writeln!(writer, "  • {CONFIG_FILENAME} already exists - skipping.")?;
    } else {
        let mut file = fs::File::create(&config_path)
            .with_context(|| format!("Failed to create {}", config_path.display()))?;
        writeln!(file, "{}", DEFAULT_CONFIG.trim())?;
        writeln!(
            writer,
            "  • Created {CONFIG_FILENAME} with default configuration."
        )?;
    }

    writeln!(writer, "Initialization complete!")?;
    Ok(())
}
