use crate::rules::RuleId;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.neatify.toml):
  Create this file in your project root to set defaults,
  or add a \"neatify\" object with the same keys to package.json.

  [neatify]
  # Rules run by `neatify all`, in order
  rules = [\"remove-unused-imports\", \"remove-unused-variables\",
           \"normalize-casing\", \"modernize-bindings\"]

  ignore_names = [\"React\"]   # Never removed or renamed
  ignore_pattern = \"^_\"       # Regex of names to leave alone
  keep_exported = true        # Leave exported declarations alone
  verify = true               # Reject rewrites that add syntax errors

  # Path filters
  exclude_folders = [\"vendor\", \"generated\"]
";

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
pub struct OutputOptions {
    /// Output raw JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output for debugging (shows files being processed).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Shared path arguments.
#[derive(Args, Debug, Default, Clone)]
pub struct PathArgs {
    /// Files or directories to process.
    /// Directories are walked for JavaScript and TypeScript sources.
    /// When no paths are provided, defaults to the current directory.
    pub paths: Vec<PathBuf>,

    /// Folders to exclude when walking directories.
    #[arg(long, short = 'e', alias = "exclude-folder")]
    pub exclude: Vec<String>,
}

impl PathArgs {
    /// The given paths, or the current directory when none were given.
    #[must_use]
    pub fn targets(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.paths.clone()
        }
    }
}

/// Options controlling how rewritten text is delivered.
#[derive(Args, Debug, Default, Clone)]
pub struct WriteOptions {
    /// Show a unified diff of what would change without writing files.
    #[arg(long, conflicts_with = "stdout")]
    pub dry_run: bool,

    /// Print the rewritten text instead of writing files.
    #[arg(long)]
    pub stdout: bool,
}

impl WriteOptions {
    /// Whether files on disk may be modified.
    #[must_use]
    pub fn writes_files(&self) -> bool {
        !self.dry_run && !self.stdout
    }
}

/// Command line interface configuration using `clap`.
/// This struct defines the arguments and flags accepted by the program.
#[derive(Parser, Debug)]
#[command(
    name = "neatify",
    author,
    version,
    about = "Neatify - Remove unused imports and variables, normalize casing and modernize bindings in JavaScript/TypeScript",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    #[command(subcommand)]
    /// The subcommand to execute.
    pub command: Commands,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,
}

#[derive(Subcommand, Debug)]
/// Available subcommands.
pub enum Commands {
    /// Run a single rule
    Run {
        /// Rule to run (see `neatify rules`).
        rule: RuleId,

        /// Path options.
        #[command(flatten)]
        paths: PathArgs,

        /// Write options.
        #[command(flatten)]
        write: WriteOptions,
    },
    /// Run every configured rule in order
    All {
        /// Path options.
        #[command(flatten)]
        paths: PathArgs,

        /// Write options.
        #[command(flatten)]
        write: WriteOptions,
    },
    /// List declared variables and functions
    Summary {
        /// Path options.
        #[command(flatten)]
        paths: PathArgs,
    },
    /// List available rules
    Rules,
    /// Create a default .neatify.toml in the current directory
    Init,
    /// Start MCP server for LLM integration (Claude Desktop, VS Code Copilot, etc.)
    #[command(name = "mcp-server")]
    McpServer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from(["neatify", "run", "normalize-casing", "src", "--dry-run"])
            .unwrap();
        match cli.command {
            Commands::Run { rule, paths, write } => {
                assert_eq!(rule, RuleId::Casing);
                assert_eq!(paths.paths, vec![PathBuf::from("src")]);
                assert!(write.dry_run);
                assert!(!write.writes_files());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_rule_rejected() {
        assert!(Cli::try_parse_from(["neatify", "run", "tidy-up", "a.js"]).is_err());
    }

    #[test]
    fn test_dry_run_conflicts_with_stdout() {
        assert!(Cli::try_parse_from(["neatify", "all", "a.js", "--dry-run", "--stdout"]).is_err());
    }

    #[test]
    fn test_global_json_flag() {
        let cli = Cli::try_parse_from(["neatify", "summary", "--json"]).unwrap();
        assert!(cli.output.json);
        match cli.command {
            Commands::Summary { paths } => assert_eq!(paths.targets(), vec![PathBuf::from(".")]),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
