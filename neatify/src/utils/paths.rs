//! Path utilities for Neatify.
//!
//! This module consolidates all path-related logic for:
//! - Cross-platform path normalization
//! - JavaScript/TypeScript file discovery with gitignore support

use crate::constants::get_default_excludes;
use crate::cst::SourceLanguage;
use std::path::{Path, PathBuf};

/// Normalizes a path for CLI display.
///
/// - Converts backslashes to forward slashes (for cross-platform consistency)
/// - Strips leading "./" or ".\" prefix (for cleaner output)
///
/// # Examples
/// ```
/// use std::path::Path;
/// use neatify::utils::normalize_display_path;
///
/// assert_eq!(normalize_display_path(Path::new(".\\src\\app.ts")), "src/app.ts");
/// assert_eq!(normalize_display_path(Path::new("./src/index.js")), "src/index.js");
/// ```
#[must_use]
pub fn normalize_display_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    // Strip Windows extended path prefix if present
    let clean = s.trim_start_matches(r"\\?\");
    let normalized = clean.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}

/// Checks if a name matches any exclusion pattern.
/// Supports exact matching and wildcard patterns starting with `*.`.
#[must_use]
pub fn is_excluded(name: &str, excludes: &[String]) -> bool {
    excludes.iter().any(|exclude| match exclude.strip_prefix('*') {
        Some(suffix) if suffix.starts_with('.') => name.ends_with(suffix),
        _ => name == exclude,
    })
}

/// Collects JavaScript/TypeScript files under `root` with gitignore support.
///
/// Uses the `ignore` crate to respect .gitignore, .git/info/exclude, and global gitignore
/// IN ADDITION to the default exclusions (`node_modules`, `dist`, build output, etc.).
/// Declaration files (`.d.ts`) are skipped.
///
/// # Returns
/// Tuple of (source files found, directory count)
#[must_use]
pub fn collect_source_files(root: &Path, exclude: &[String], verbose: bool) -> (Vec<PathBuf>, usize) {
    use ignore::WalkBuilder;

    let excludes = exclude.to_vec();
    let root_for_filter = root.to_path_buf();

    // filter_entry prunes excluded directories at traversal time
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(move |entry| {
            if entry.path() == root_for_filter {
                return true;
            }
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            !entry.file_name().to_str().is_some_and(|name| {
                get_default_excludes().contains(name) || is_excluded(name, &excludes)
            })
        })
        .build();

    let mut files = Vec::new();
    let mut dir_count = 0;

    for result in walker {
        match result {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    if path != root {
                        dir_count += 1;
                    }
                    continue;
                }
                if SourceLanguage::is_source_path(path) {
                    files.push(path.to_path_buf());
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "walk error");
                if verbose {
                    eprintln!("Walk error: {e}");
                }
            }
        }
    }

    files.sort();
    (files, dir_count)
}

/// Expands command-line targets into files.
///
/// Files are taken as given, whatever their extension; directories are walked.
#[must_use]
pub fn expand_targets(paths: &[PathBuf], exclude: &[String], verbose: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let (found, dirs) = collect_source_files(path, exclude, verbose);
            tracing::debug!(root = %path.display(), files = found.len(), dirs, "walked directory");
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_excluded() {
        let excludes = vec!["vendor".to_owned(), "*.min.js".to_owned()];
        assert!(is_excluded("vendor", &excludes));
        assert!(is_excluded("app.min.js", &excludes));
        assert!(!is_excluded("vendors", &excludes));
        assert!(!is_excluded("app.js", &excludes));
    }

    #[test]
    fn test_collect_source_files_exclusion() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();

        fs::write(root.join("index.js"), "// main")?;
        fs::write(root.join("app.tsx"), "// app")?;
        fs::write(root.join("types.d.ts"), "// types")?;
        fs::write(root.join("README.md"), "# readme")?;

        fs::create_dir_all(root.join("node_modules/pkg"))?;
        fs::write(root.join("node_modules/pkg/index.js"), "// dep")?;

        fs::create_dir_all(root.join("dist"))?;
        fs::write(root.join("dist/bundle.js"), "// built")?;

        fs::create_dir_all(root.join("src"))?;
        fs::write(root.join("src/module.ts"), "// module")?;

        let (files, _) = collect_source_files(root, &[], false);

        let file_names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name())
            .filter_map(|f| f.to_str())
            .collect();

        assert_eq!(file_names.len(), 3);
        assert!(file_names.contains(&"index.js"));
        assert!(file_names.contains(&"app.tsx"));
        assert!(file_names.contains(&"module.ts"));
        assert!(!file_names.contains(&"bundle.js"));
        assert!(!file_names.contains(&"types.d.ts"));

        Ok(())
    }

    #[test]
    fn test_user_excludes() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("legacy"))?;
        fs::write(root.join("legacy/old.js"), "var a;")?;
        fs::write(root.join("new.js"), "let a;")?;

        let (files, _) = collect_source_files(root, &["legacy".to_owned()], false);
        assert_eq!(files.len(), 1);
        Ok(())
    }

    #[test]
    fn test_expand_targets_mixes_files_and_dirs() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        fs::create_dir_all(root.join("src"))?;
        fs::write(root.join("src/a.js"), "")?;
        fs::write(root.join("script.txt"), "")?;

        let files = expand_targets(&[root.join("src"), root.join("script.txt")], &[], false);
        assert_eq!(files.len(), 2);
        Ok(())
    }
}
