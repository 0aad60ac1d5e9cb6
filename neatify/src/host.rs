//! Boundary between the engine and whatever holds the text.
//!
//! A host supplies the current snapshot, applies rewritten text and shows
//! summaries. Hosts are passed to a [`Session`] at call time.

use crate::engine::{Engine, RunReport};
use crate::error::{NeatifyError, Result};
use crate::rules::RuleId;
use crate::semantic::DeclarationSummary;
use std::fs;
use std::path::{Path, PathBuf};

/// Message shown when no snapshot is available.
pub const NO_EDITOR_NOTICE: &str = "No active editor open!";

/// Message shown after a successful pipeline run.
pub const OPTIMIZED_NOTICE: &str = "File optimized!";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Text of one file at one point in time.
pub struct Snapshot {
    /// Full text.
    pub text: String,
    /// File name or path, used to pick the grammar.
    pub identity: String,
}

/// Supplies the text a run operates on.
pub trait SnapshotProvider {
    /// Current snapshot, or `None` when there is nothing to work on.
    fn snapshot(&self) -> Option<Snapshot>;
}

/// Applies rewritten text back to the host.
pub trait EditSink {
    /// Replace the snapshot's text with `updated`.
    ///
    /// # Errors
    /// Returns a description of why the host could not apply the text
    fn apply(&mut self, snapshot: &Snapshot, updated: &str) -> std::result::Result<(), String>;
}

/// Shows messages to the user.
pub trait NotificationSink {
    /// Display one message.
    fn notify(&mut self, message: &str);
}

/// A host that provides all three host interfaces.
pub trait Host: SnapshotProvider + EditSink + NotificationSink {}

impl<T: SnapshotProvider + EditSink + NotificationSink> Host for T {}

/// Runs engine operations against a host.
#[derive(Debug, Clone, Copy)]
pub struct Session<'e> {
    engine: &'e Engine,
}

impl<'e> Session<'e> {
    /// Session backed by `engine`.
    #[must_use]
    pub fn new(engine: &'e Engine) -> Self {
        Self { engine }
    }

    /// Run one rule on the host's snapshot and apply the result.
    ///
    /// Returns `Ok(None)` after notifying the user when there is no snapshot.
    ///
    /// # Errors
    /// Returns error if the rule fails or the host rejects the edit; the
    /// host's text is left untouched
    pub fn run_rule<H: Host>(&self, host: &mut H, rule: RuleId) -> Result<Option<RunReport>> {
        let Some(snapshot) = current_snapshot(host) else {
            return Ok(None);
        };
        let report = self
            .engine
            .run_rule(rule, &snapshot.text, &snapshot.identity)
            .inspect_err(|e| host.notify(&e.to_string()))?;
        commit(host, &snapshot, &report)?;
        for result in &report.results {
            host.notify(&result.summary_lines.join("\n"));
        }
        Ok(Some(report))
    }

    /// Run the configured pipeline on the host's snapshot.
    ///
    /// The host sees either the final text of every stage or nothing.
    ///
    /// # Errors
    /// Returns [`NeatifyError::StageFailed`] naming the first failing stage
    pub fn run_all<H: Host>(&self, host: &mut H) -> Result<Option<RunReport>> {
        let Some(snapshot) = current_snapshot(host) else {
            return Ok(None);
        };
        let report = self
            .engine
            .run_all(&snapshot.text, &snapshot.identity)
            .inspect_err(|e| host.notify(&format!("Optimization failed: {e}")))?;
        commit(host, &snapshot, &report)?;
        for summary in report.summaries() {
            host.notify(summary);
        }
        host.notify(OPTIMIZED_NOTICE);
        Ok(Some(report))
    }

    /// Show the declaration summary of the host's snapshot.
    ///
    /// # Errors
    /// Returns error if no tree could be produced
    pub fn summarize_declarations<H: SnapshotProvider + NotificationSink>(
        &self,
        host: &mut H,
    ) -> Result<Option<DeclarationSummary>> {
        let Some(snapshot) = current_snapshot(host) else {
            return Ok(None);
        };
        let summary = self
            .engine
            .summarize_declarations(&snapshot.text, &snapshot.identity)?;
        host.notify(&summary.to_string());
        Ok(Some(summary))
    }
}

fn current_snapshot<H: SnapshotProvider + NotificationSink>(host: &mut H) -> Option<Snapshot> {
    let snapshot = host.snapshot();
    if snapshot.is_none() {
        tracing::debug!("no snapshot available");
        host.notify(NO_EDITOR_NOTICE);
    }
    snapshot
}

fn commit<H: EditSink + NotificationSink>(
    host: &mut H,
    snapshot: &Snapshot,
    report: &RunReport,
) -> Result<()> {
    if report.updated_text == snapshot.text {
        return Ok(());
    }
    host.apply(snapshot, &report.updated_text).map_err(|reason| {
        host.notify(&format!("Could not apply edits: {reason}"));
        NeatifyError::Sink(reason)
    })
}

/// In-memory host holding a single buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    text: Option<String>,
    identity: String,
    reject_edits: bool,
    notices: Vec<String>,
    applied: usize,
}

impl MemoryHost {
    /// Host with an open buffer named `identity`.
    #[must_use]
    pub fn new(text: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            identity: identity.into(),
            ..Self::default()
        }
    }

    /// Host with no open buffer.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Make every subsequent edit fail.
    #[must_use]
    pub fn rejecting_edits(mut self) -> Self {
        self.reject_edits = true;
        self
    }

    /// Current buffer text.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Messages shown so far.
    #[must_use]
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Number of edits applied to the buffer.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.applied
    }
}

impl SnapshotProvider for MemoryHost {
    fn snapshot(&self) -> Option<Snapshot> {
        self.text.as_ref().map(|text| Snapshot {
            text: text.clone(),
            identity: self.identity.clone(),
        })
    }
}

impl EditSink for MemoryHost {
    fn apply(&mut self, _snapshot: &Snapshot, updated: &str) -> std::result::Result<(), String> {
        if self.reject_edits {
            return Err("buffer is read-only".to_owned());
        }
        self.text = Some(updated.to_owned());
        self.applied += 1;
        Ok(())
    }
}

impl NotificationSink for MemoryHost {
    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_owned());
    }
}

/// Filesystem-backed host for one file.
///
/// Messages are collected rather than printed so callers decide where they go.
#[derive(Debug, Clone)]
pub struct FileHost {
    path: PathBuf,
    write: bool,
    notices: Vec<String>,
}

impl FileHost {
    /// Host for `path`; when `write` is false edits are accepted but not written.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, write: bool) -> Self {
        Self {
            path: path.into(),
            write,
            notices: Vec::new(),
        }
    }

    /// The file this host edits.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Messages shown so far.
    #[must_use]
    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

impl SnapshotProvider for FileHost {
    fn snapshot(&self) -> Option<Snapshot> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Some(Snapshot {
                text,
                identity: self.path.to_string_lossy().into_owned(),
            }),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "cannot read file");
                None
            }
        }
    }
}

impl EditSink for FileHost {
    fn apply(&mut self, _snapshot: &Snapshot, updated: &str) -> std::result::Result<(), String> {
        if !self.write {
            return Ok(());
        }
        fs::write(&self.path, updated).map_err(|e| format!("{}: {e}", self.path.display()))
    }
}

impl NotificationSink for FileHost {
    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_owned());
    }
}
