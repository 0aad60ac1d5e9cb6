//! `run` and `all` commands: rewrite files with one rule or the pipeline.

use crate::engine::{Engine, RunReport};
use crate::error::NeatifyError;
use crate::host::{EditSink, FileHost, SnapshotProvider};
use crate::output;
use crate::rules::{RuleId, RuleResult};
use crate::utils::normalize_display_path;

use anyhow::{anyhow, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// What to run on each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixMode {
    /// A single rule.
    Rule(RuleId),
    /// The configured pipeline.
    Pipeline,
}

/// Options for the fix commands.
#[derive(Debug, Default, Clone)]
pub struct FixOptions {
    /// Show a diff instead of writing.
    pub dry_run: bool,
    /// Print rewritten text instead of writing.
    pub stdout: bool,
    /// Emit JSON.
    pub json: bool,
    /// Print individual changes and skipped renames.
    pub verbose: bool,
}

impl FixOptions {
    fn writes_files(&self) -> bool {
        !self.dry_run && !self.stdout
    }
}

/// Result of processing one file.
#[derive(Debug, Serialize)]
pub struct FileOutcome {
    /// File as displayed.
    pub file: String,
    /// Whether the file's text changed (or would change).
    pub changed: bool,
    /// Per-rule results, empty when the file failed.
    pub results: Vec<RuleResult>,
    /// Failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failing pipeline stage, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_rule: Option<RuleId>,
    /// Rewritten text, included with `--stdout`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_text: Option<String>,
    #[serde(skip)]
    original: String,
    #[serde(skip)]
    rewritten: String,
}

/// JSON document for a fix run.
#[derive(Debug, Serialize)]
struct FixReport<'a> {
    dry_run: bool,
    files: &'a [FileOutcome],
    changed: usize,
    failed: usize,
}

/// Run a rule or the pipeline over `files`.
///
/// Files are processed in parallel; output is written in input order.
/// Returns the exit code: 1 when any file failed.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn run_fix<W: Write>(
    engine: &Engine,
    files: &[PathBuf],
    mode: FixMode,
    options: &FixOptions,
    writer: &mut W,
) -> Result<i32> {
    let progress = output::create_progress_bar(files.len() as u64, options.json || files.len() < 2);
    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|path| {
            let outcome = process_file(engine, path, mode, options);
            progress.inc(1);
            outcome
        })
        .collect();
    progress.finish_and_clear();

    let changed = outcomes.iter().filter(|o| o.changed).count();
    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();

    if options.json {
        let report = FixReport {
            dry_run: options.dry_run,
            files: &outcomes,
            changed,
            failed,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else if options.stdout {
        write_texts(writer, &outcomes)?;
    } else {
        for outcome in &outcomes {
            write_outcome(writer, outcome, options)?;
        }
        if outcomes.len() > 1 || options.dry_run {
            output::print_totals(writer, outcomes.len(), changed, failed, options.dry_run)?;
        }
    }

    Ok(i32::from(failed > 0))
}

fn process_file(engine: &Engine, path: &Path, mode: FixMode, options: &FixOptions) -> FileOutcome {
    let file = normalize_display_path(path);
    let mut host = FileHost::new(path, options.writes_files());

    let run = host
        .snapshot()
        .ok_or_else(|| anyhow!("Failed to read {file}"))
        .and_then(|snapshot| {
            let report = match mode {
                FixMode::Rule(rule) => engine.run_rule(rule, &snapshot.text, &snapshot.identity),
                FixMode::Pipeline => engine.run_all(&snapshot.text, &snapshot.identity),
            }?;
            if report.updated_text != snapshot.text {
                host.apply(&snapshot, &report.updated_text)
                    .map_err(NeatifyError::Sink)?;
            }
            Ok((snapshot.text, report))
        });

    match run {
        Ok((original, report)) => {
            tracing::debug!(%file, edits = report.edits_applied(), "processed");
            let RunReport {
                updated_text,
                results,
            } = report;
            FileOutcome {
                changed: updated_text != original,
                file,
                results,
                error: None,
                failed_rule: None,
                updated_text: options.stdout.then(|| updated_text.clone()),
                original,
                rewritten: updated_text,
            }
        }
        Err(e) => {
            let failed_rule = e.downcast_ref::<NeatifyError>().and_then(NeatifyError::rule);
            FileOutcome {
                file,
                changed: false,
                results: Vec::new(),
                error: Some(format!("{e:#}")),
                failed_rule,
                updated_text: None,
                original: String::new(),
                rewritten: String::new(),
            }
        }
    }
}

fn write_texts<W: Write>(writer: &mut W, outcomes: &[FileOutcome]) -> Result<()> {
    let many = outcomes.len() > 1;
    for outcome in outcomes {
        if let Some(error) = &outcome.error {
            output::print_file_error(&mut std::io::stderr(), &outcome.file, error)?;
            continue;
        }
        if many {
            writeln!(writer, "// ==> {} <==", outcome.file)?;
        }
        write!(writer, "{}", outcome.rewritten)?;
    }
    Ok(())
}

fn write_outcome<W: Write>(writer: &mut W, outcome: &FileOutcome, options: &FixOptions) -> Result<()> {
    if let Some(error) = &outcome.error {
        output::print_file_error(writer, &outcome.file, error)?;
        return Ok(());
    }
    output::print_file_results(writer, &outcome.file, &outcome.results, options.verbose)?;
    if options.dry_run && outcome.changed {
        output::print_diff(writer, &outcome.file, &outcome.original, &outcome.rewritten)?;
    }
    Ok(())
}
