//! Error types surfaced by the engine.

use crate::cst::ParseFailure;
use crate::fix::{ConflictError, RewriteError};
use crate::rules::{RuleId, UnknownRule};

/// Failure of one engine operation.
///
/// A failed rule run never leaves a partially edited snapshot behind: the
/// caller keeps the text it passed in.
#[derive(Debug, thiserror::Error)]
pub enum NeatifyError {
    /// No tree could be produced for the snapshot.
    #[error(transparent)]
    Parse(#[from] ParseFailure),
    /// A rule proposed overlapping edits.
    #[error("{rule}: {source}")]
    Conflict {
        /// Rule that proposed the edits.
        rule: RuleId,
        /// The overlap.
        #[source]
        source: ConflictError,
    },
    /// The merged edit set did not fit the snapshot.
    #[error("{rule}: {source}")]
    Rewrite {
        /// Rule whose edits failed to apply.
        rule: RuleId,
        /// What went wrong.
        #[source]
        source: RewriteError,
    },
    /// The rewritten text parses with more errors than the input.
    #[error("{rule} would introduce syntax errors ({before} before, {after} after); no changes applied")]
    SyntaxRegression {
        /// Rule whose output was rejected.
        rule: RuleId,
        /// Error nodes in the input.
        before: usize,
        /// Error nodes in the output.
        after: usize,
    },
    /// A pipeline stage failed; later stages did not run.
    #[error("pipeline stopped at stage {index} ({stage}): {source}")]
    StageFailed {
        /// Failing rule.
        stage: RuleId,
        /// Zero-based position in the pipeline.
        index: usize,
        /// Why it failed.
        #[source]
        source: Box<NeatifyError>,
    },
    /// The host could not apply the rewritten text.
    #[error("failed to apply edits: {0}")]
    Sink(String),
    /// A configured rule id names no rule.
    #[error(transparent)]
    UnknownRule(#[from] UnknownRule),
    /// The configured ignore pattern is not a valid regex.
    #[error("invalid ignore_pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl NeatifyError {
    /// Rule the error is attributed to, if any.
    #[must_use]
    pub fn rule(&self) -> Option<RuleId> {
        match self {
            Self::Conflict { rule, .. }
            | Self::Rewrite { rule, .. }
            | Self::SyntaxRegression { rule, .. } => Some(*rule),
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result alias for engine operations.
pub type Result<T, E = NeatifyError> = std::result::Result<T, E>;
