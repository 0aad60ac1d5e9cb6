use crate::cli::{Cli, Commands, PathArgs, WriteOptions};
use crate::commands::{run_fix, run_init, run_summary, FixMode, FixOptions};
use crate::config::Config;
use crate::engine::Engine;
use crate::output;
use crate::utils::expand_targets;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a stderr `tracing` subscriber when `RUST_LOG` is set.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init();
}

/// Runs Neatify with the given arguments.
///
/// # Errors
///
/// Returns an error if argument parsing fails, or if the command execution fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Run Neatify with the given arguments, writing output to the specified writer.
///
/// This is the testable version of `run_with_args` that allows output capture.
///
/// # Errors
///
/// Returns an error if argument parsing fails, or if the command execution fails.
pub fn run_with_args_to<W: std::io::Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    init_tracing();

    let mut program_args = vec!["neatify".to_owned()];
    program_args.extend(args);
    let cli_var = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{e}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{e}");
                return Ok(1);
            }
        },
    };

    let json = cli_var.output.json;
    let verbose = cli_var.output.verbose;

    match cli_var.command {
        Commands::Run { rule, paths, write } => {
            run_files(FixMode::Rule(rule), &paths, &write, json, verbose, writer)
        }
        Commands::All { paths, write } => {
            run_files(FixMode::Pipeline, &paths, &write, json, verbose, writer)
        }
        Commands::Summary { paths } => {
            let targets = paths.targets();
            let Some((config, engine)) = load_engine(&targets)? else {
                return Ok(1);
            };
            let files = collect_files(&targets, &paths, &config, verbose, json)?;
            run_summary(&engine, &files, json, writer)
        }
        Commands::Rules => {
            let config = Config::load();
            let engine = match Engine::new(&config) {
                Ok(engine) => engine,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return Ok(1);
                }
            };
            if json {
                let rules: Vec<_> = crate::rules::RuleId::ALL
                    .iter()
                    .map(|rule| {
                        serde_json::json!({
                            "id": rule,
                            "description": rule.description(),
                            "in_pipeline": engine.pipeline().contains(rule),
                        })
                    })
                    .collect();
                writeln!(writer, "{}", serde_json::to_string_pretty(&rules)?)?;
            } else {
                output::print_rules(writer, engine.pipeline())?;
            }
            Ok(0)
        }
        Commands::Init => {
            run_init(writer)?;
            Ok(0)
        }
        Commands::McpServer => {
            // Served by the neatify-cli binary, which intercepts this before calling here
            eprintln!("Error: mcp-server command should be handled by neatify-cli directly.");
            eprintln!("If you're seeing this, please use the neatify binary from neatify-cli.");
            Ok(1)
        }
    }
}

fn run_files<W: std::io::Write>(
    mode: FixMode,
    paths: &PathArgs,
    write: &WriteOptions,
    json: bool,
    verbose: bool,
    writer: &mut W,
) -> Result<i32> {
    let targets = paths.targets();
    let Some((config, engine)) = load_engine(&targets)? else {
        return Ok(1);
    };
    let files = collect_files(&targets, paths, &config, verbose, json)?;
    let options = FixOptions {
        dry_run: write.dry_run,
        stdout: write.stdout,
        json,
        verbose,
    };
    run_fix(&engine, &files, mode, &options, writer)
}

/// Load configuration near the first target and build the engine.
///
/// Returns `None` after reporting a missing path or a configuration the
/// engine rejects.
fn load_engine(targets: &[PathBuf]) -> Result<Option<(Config, Engine)>> {
    if let Some(missing) = targets.iter().find(|p| !p.exists()) {
        eprintln!(
            "Error: The file or directory '{}' does not exist.",
            missing.display()
        );
        return Ok(None);
    }
    let first = targets.first().map_or(Path::new("."), PathBuf::as_path);
    let anchor = first
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", first.display()))?;
    let config = Config::load_from_path(&anchor);
    if let Some(path) = &config.config_file_path {
        tracing::debug!(config = %path.display(), "loaded configuration");
    }
    match Engine::new(&config) {
        Ok(engine) => Ok(Some((config, engine))),
        Err(e) => {
            eprintln!("Error: {e}");
            Ok(None)
        }
    }
}

fn collect_files(
    targets: &[PathBuf],
    paths: &PathArgs,
    config: &Config,
    verbose: bool,
    json: bool,
) -> Result<Vec<PathBuf>> {
    let mut exclude = config.neatify.exclude_folders().to_vec();
    exclude.extend(paths.exclude.iter().cloned());

    if verbose && !json {
        eprintln!("[VERBOSE] Neatify v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("[VERBOSE] Using {} threads", rayon::current_num_threads());
        if targets.iter().any(|t| t.is_dir()) {
            output::print_exclusion_list(&mut std::io::stderr(), &exclude)?;
        }
    }

    let files = expand_targets(targets, &exclude, verbose);
    if verbose && !json {
        eprintln!("[VERBOSE] {} file(s) to process", files.len());
    }
    Ok(files)
}
