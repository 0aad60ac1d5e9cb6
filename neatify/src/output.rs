use crate::rules::{RuleId, RuleResult};
use crate::semantic::DeclarationSummary;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use similar::{ChangeTag, TextDiff};
use std::io::Write;
use std::time::Duration;

/// Print the exclusion list in styled format.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_exclusion_list(writer: &mut impl Write, folders: &[String]) -> std::io::Result<()> {
    if folders.is_empty() {
        let mut sorted_defaults: Vec<&str> = crate::constants::DEFAULT_EXCLUDE_FOLDERS.to_vec();
        sorted_defaults.sort_unstable();
        let list = sorted_defaults.join(", ");
        writeln!(
            writer,
            "{} {}",
            "[OK] Using default exclusions only:".green(),
            list.dimmed()
        )?;
    } else {
        writeln!(
            writer,
            "{} {}",
            "Excluding:".yellow().bold(),
            folders.join(", ")
        )?;
    }
    Ok(())
}

/// Create a progress bar with file count.
///
/// In test mode, or when `hidden` is set, returns a hidden progress bar to
/// avoid polluting output.
#[must_use]
pub fn create_progress_bar(total_files: u64, hidden: bool) -> ProgressBar {
    if cfg!(test) || hidden {
        return ProgressBar::hidden();
    }

    let pb =
        ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::stderr_with_hz(20));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_message("neatifying...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Helper to create a styled table
fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

/// Print the rule listing.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_rules(writer: &mut impl Write, pipeline: &[RuleId]) -> std::io::Result<()> {
    let mut table = create_table(vec!["Rule", "Pipeline", "Description"]);
    for rule in RuleId::ALL {
        let position = pipeline
            .iter()
            .position(|r| *r == rule)
            .map_or_else(|| "-".to_owned(), |i| (i + 1).to_string());
        table.add_row(vec![
            Cell::new(rule.as_str()).add_attribute(Attribute::Bold),
            Cell::new(position),
            Cell::new(rule.description()),
        ]);
    }
    writeln!(writer, "{table}")
}

/// Print what each rule did to one file.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_file_results(
    writer: &mut impl Write,
    file: &str,
    results: &[RuleResult],
    verbose: bool,
) -> std::io::Result<()> {
    let changed = results.iter().any(RuleResult::changed);
    let marker = if changed { "✎".yellow() } else { "✓".green() };
    writeln!(writer, "{marker} {}", file.bold())?;
    for result in results {
        let summary = if result.changed() {
            result.summary().normal()
        } else {
            result.summary().dimmed()
        };
        writeln!(writer, "    {} {summary}", format!("[{}]", result.rule).cyan())?;
        if verbose {
            for change in &result.changes {
                writeln!(writer, "        {} {change}", "-".dimmed())?;
            }
            for skipped in result.summary_lines.iter().skip(1) {
                writeln!(writer, "        {}", skipped.yellow())?;
            }
        }
    }
    Ok(())
}

/// Print a failed file.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_file_error(writer: &mut impl Write, file: &str, error: &str) -> std::io::Result<()> {
    writeln!(writer, "{} {}", "✗".red().bold(), file.bold())?;
    writeln!(writer, "    {}", error.red())
}

/// Print a colored unified diff between two versions of a file.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_diff(
    writer: &mut impl Write,
    file: &str,
    original: &str,
    updated: &str,
) -> std::io::Result<()> {
    let diff = TextDiff::from_lines(original, updated);
    writeln!(writer, "{}", format!("--- a/{file}").red())?;
    writeln!(writer, "{}", format!("+++ b/{file}").green())?;
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        writeln!(writer, "{}", hunk.header().to_string().cyan())?;
        for change in hunk.iter_changes() {
            let value = change.value();
            let value = value.strip_suffix('\n').unwrap_or(value);
            match change.tag() {
                ChangeTag::Delete => writeln!(writer, "{}", format!("-{value}").red())?,
                ChangeTag::Insert => writeln!(writer, "{}", format!("+{value}").green())?,
                ChangeTag::Equal => writeln!(writer, " {value}")?,
            }
            if change.missing_newline() {
                writeln!(writer, "\\ No newline at end of file")?;
            }
        }
    }
    Ok(())
}

/// Print declaration summaries as a table.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_declarations(
    writer: &mut impl Write,
    rows: &[(String, DeclarationSummary)],
) -> std::io::Result<()> {
    if rows.len() == 1 {
        return writeln!(writer, "{}", rows[0].1);
    }
    let mut table = create_table(vec!["File", "Variables", "Functions"]);
    for (file, summary) in rows {
        let group = |names: &[String]| {
            if names.is_empty() {
                Cell::new("None").fg(Color::DarkGrey)
            } else {
                Cell::new(names.join(", "))
            }
        };
        table.add_row(vec![
            Cell::new(file).add_attribute(Attribute::Bold),
            group(&summary.variable_names),
            group(&summary.function_names),
        ]);
    }
    writeln!(writer, "{table}")
}

/// Print the closing totals line.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_totals(
    writer: &mut impl Write,
    files: usize,
    changed: usize,
    failed: usize,
    dry_run: bool,
) -> std::io::Result<()> {
    let verb = if dry_run { "would change" } else { "changed" };
    let failed_text = if failed == 0 {
        failed.to_string().green()
    } else {
        failed.to_string().red().bold()
    };
    writeln!(
        writer,
        "\n{}",
        format!(
            "Processed {} files: {} {verb}, {} failed",
            files.to_string().bold(),
            changed.to_string().bold(),
            failed_text
        )
        .dimmed()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_print_diff() {
        let out = render(|w| print_diff(w, "a.js", "var a = 1;\nuse(a);\n", "let a = 1;\nuse(a);\n"));
        assert!(out.contains("--- a/a.js"));
        assert!(out.contains("-var a = 1;"));
        assert!(out.contains("+let a = 1;"));
        assert!(out.contains(" use(a);"));
    }

    #[test]
    fn test_print_rules_lists_all() {
        let out = render(|w| print_rules(w, &[RuleId::Bindings]));
        for rule in RuleId::ALL {
            assert!(out.contains(rule.as_str()));
        }
    }

    #[test]
    fn test_single_summary_is_plain() {
        let summary = DeclarationSummary {
            variable_names: vec!["a".to_owned()],
            function_names: Vec::new(),
        };
        let out = render(|w| print_declarations(w, &[("a.js".to_owned(), summary)]));
        assert_eq!(out, "Variables: a | Functions: None\n");
    }
}
