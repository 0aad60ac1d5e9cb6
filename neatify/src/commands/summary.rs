//! `summary` command: list declared variables and functions.

use crate::engine::Engine;
use crate::output;
use crate::semantic::DeclarationSummary;
use crate::utils::normalize_display_path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct FileDeclarations {
    file: String,
    #[serde(flatten)]
    summary: DeclarationSummary,
}

/// Print the declaration summary of every file.
///
/// Returns the exit code: 1 when any file could not be read or parsed.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn run_summary<W: Write>(
    engine: &Engine,
    files: &[PathBuf],
    json: bool,
    writer: &mut W,
) -> Result<i32> {
    let collected: Vec<(String, Result<DeclarationSummary>)> = files
        .par_iter()
        .map(|path| {
            let file = normalize_display_path(path);
            let summary = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {file}"))
                .and_then(|text| {
                    engine
                        .summarize_declarations(&text, &path.to_string_lossy())
                        .map_err(anyhow::Error::from)
                });
            (file, summary)
        })
        .collect();

    let mut rows = Vec::with_capacity(collected.len());
    let mut failed = 0;
    for (file, summary) in collected {
        match summary {
            Ok(summary) => rows.push((file, summary)),
            Err(e) => {
                failed += 1;
                output::print_file_error(&mut std::io::stderr(), &file, &format!("{e:#}"))?;
            }
        }
    }

    if json {
        let documents: Vec<FileDeclarations> = rows
            .into_iter()
            .map(|(file, summary)| FileDeclarations { file, summary })
            .collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&documents)?)?;
    } else {
        output::print_declarations(writer, &rows)?;
    }
    Ok(i32::from(failed > 0))
}
