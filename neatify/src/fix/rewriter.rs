//! Byte-range safe code rewriter.
//!
//! This module provides the edit coordinator: it merges the edits a rule
//! proposes into a conflict-free [`EditSet`] and applies that set to the
//! snapshot it was computed against.
//!
//! # Usage
//!
//! ```
//! use neatify::fix::{ByteRangeRewriter, EditOp};
//!
//! let source = "hello world";
//! let mut rewriter = ByteRangeRewriter::new(source);
//! rewriter.add_edit(EditOp::replace(0, 5, "hi"));
//! let fixed = rewriter.apply().expect("should apply");
//! assert_eq!(fixed, "hi world");
//! ```

use crate::cst::TextRange;
use serde::Serialize;

/// A single edit operation against one text snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    /// Remove the bytes in `range`
    Delete {
        /// Range to remove
        range: TextRange,
    },
    /// Replace the bytes in `range` with `text`
    Replace {
        /// Range to replace
        range: TextRange,
        /// Replacement content
        text: String,
    },
    /// Insert `text` before `offset`
    Insert {
        /// Insertion point
        offset: usize,
        /// Inserted content
        text: String,
    },
}

impl EditOp {
    /// Create a deletion edit
    #[must_use]
    pub fn delete(start_byte: usize, end_byte: usize) -> Self {
        Self::Delete {
            range: TextRange::new(start_byte, end_byte),
        }
    }

    /// Create a replacement edit
    #[must_use]
    pub fn replace(start_byte: usize, end_byte: usize, text: impl Into<String>) -> Self {
        Self::Replace {
            range: TextRange::new(start_byte, end_byte),
            text: text.into(),
        }
    }

    /// Create an insertion edit (insert before position)
    #[must_use]
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::Insert {
            offset,
            text: text.into(),
        }
    }

    /// Range of the original snapshot this edit touches.
    #[must_use]
    pub fn range(&self) -> TextRange {
        match self {
            Self::Delete { range } | Self::Replace { range, .. } => *range,
            Self::Insert { offset, .. } => TextRange::empty(*offset),
        }
    }

    /// Text written in place of [`Self::range`].
    #[must_use]
    pub fn replacement(&self) -> &str {
        match self {
            Self::Delete { .. } => "",
            Self::Replace { text, .. } | Self::Insert { text, .. } => text,
        }
    }

    /// Start byte offset (inclusive)
    #[must_use]
    pub fn start(&self) -> usize {
        self.range().start
    }

    /// End byte offset (exclusive)
    #[must_use]
    pub fn end(&self) -> usize {
        self.range().end
    }

    /// Whether this edit is a pure deletion.
    #[must_use]
    pub const fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }

    /// Whether this edit is a pure insertion.
    #[must_use]
    pub const fn is_insert(&self) -> bool {
        matches!(self, Self::Insert { .. })
    }

    /// Check if this edit overlaps with another
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.range().overlaps(&other.range())
    }

    /// Sort key among edits sharing a range: deletions first so they can
    /// absorb the rest.
    const fn precedence(&self) -> u8 {
        match self {
            Self::Delete { .. } => 0,
            Self::Replace { .. } => 1,
            Self::Insert { .. } => 2,
        }
    }

    /// Whether `self`, a deletion, swallows `other`.
    ///
    /// Insertions touching either boundary survive: they are outside the
    /// deleted text.
    fn supersedes(&self, other: &Self) -> bool {
        if !self.is_delete() {
            return false;
        }
        let outer = self.range();
        let inner = other.range();
        if other.is_insert() {
            return outer.start < inner.start && inner.start < outer.end;
        }
        outer.contains_range(&inner)
    }
}

/// Two edits whose ranges overlap with no precedence rule to settle it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("conflicting edits: #{first} at {first_range} overlaps #{second} at {second_range}")]
pub struct ConflictError {
    /// Input index of the first edit
    pub first: usize,
    /// Range of the first edit
    pub first_range: TextRange,
    /// Input index of the second edit
    pub second: usize,
    /// Range of the second edit
    pub second_range: TextRange,
}

/// Error during rewriting
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// Two or more edits have overlapping ranges
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    /// Edit range is out of bounds
    #[error("edit at {range} out of bounds: source length {source_len}")]
    OutOfBounds {
        /// Range of the bad edit
        range: TextRange,
        /// Length of the source
        source_len: usize,
    },
    /// Edit boundary falls inside a multi-byte character
    #[error("edit at {range} splits a UTF-8 character")]
    NotCharBoundary {
        /// Range of the bad edit
        range: TextRange,
    },
}

/// A non-overlapping, start-ordered set of edits scoped to one snapshot.
///
/// Only [`EditSet::merge`] builds one, so the invariant always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditSet {
    ops: Vec<EditOp>,
    #[serde(skip)]
    superseded: usize,
}

impl EditSet {
    /// Merge proposed edits into a conflict-free set.
    ///
    /// A deletion wins over any edit nested inside it and exact duplicates
    /// collapse; both are counted in [`EditSet::superseded`]. Any other
    /// overlap is a [`ConflictError`].
    ///
    /// # Errors
    /// Returns error if two edits overlap and neither supersedes the other
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn merge(edits: impl IntoIterator<Item = EditOp>) -> Result<Self, ConflictError> {
        let mut indexed: Vec<(usize, EditOp)> = edits.into_iter().enumerate().collect();
        // Same start: insertions first (they only touch), then widest range.
        indexed.sort_by(|(ia, a), (ib, b)| {
            a.start()
                .cmp(&b.start())
                .then(b.is_insert().cmp(&a.is_insert()))
                .then(b.end().cmp(&a.end()))
                .then(a.precedence().cmp(&b.precedence()))
                .then(ia.cmp(ib))
        });

        let mut kept: Vec<(usize, EditOp)> = Vec::with_capacity(indexed.len());
        // Most recent kept deletion and the furthest end among kept edits.
        let mut cover: Option<usize> = None;
        let mut max_end: Option<(usize, usize)> = None;
        let mut superseded = 0;

        for (index, op) in indexed {
            if let Some(cover_pos) = cover {
                if kept[cover_pos].1.supersedes(&op) {
                    superseded += 1;
                    continue;
                }
            }
            if let Some((_, last)) = kept.last() {
                if *last == op {
                    superseded += 1;
                    continue;
                }
            }
            if let Some((end, owner)) = max_end {
                if op.start() < end {
                    let (first, first_op) = &kept[owner];
                    return Err(ConflictError {
                        first: *first,
                        first_range: first_op.range(),
                        second: index,
                        second_range: op.range(),
                    });
                }
            }

            let pos = kept.len();
            if op.is_delete() {
                cover = Some(pos);
            }
            if max_end.map_or(true, |(end, _)| op.end() >= end) {
                max_end = Some((op.end(), pos));
            }
            kept.push((index, op));
        }

        let ops: Vec<EditOp> = kept.into_iter().map(|(_, op)| op).collect();

        if superseded > 0 {
            tracing::debug!(superseded, kept = ops.len(), "dropped nested or duplicate edits");
        }
        Ok(Self { ops, superseded })
    }

    /// Edits in ascending start order.
    #[must_use]
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// Number of edits in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of proposed edits dropped because a deletion covered them
    /// or they duplicated another edit.
    #[must_use]
    pub fn superseded(&self) -> usize {
        self.superseded
    }

    /// Validate edits against the snapshot without applying them
    ///
    /// # Errors
    /// Returns error if an edit is out of bounds or splits a character
    pub fn validate(&self, source: &str) -> Result<(), RewriteError> {
        for op in &self.ops {
            let range = op.range();
            if range.end > source.len() || range.start > range.end {
                return Err(RewriteError::OutOfBounds {
                    range,
                    source_len: source.len(),
                });
            }
            if !source.is_char_boundary(range.start) || !source.is_char_boundary(range.end) {
                return Err(RewriteError::NotCharBoundary { range });
            }
        }
        Ok(())
    }

    /// Apply all edits and return the modified source
    ///
    /// Edits are applied in reverse order (by start position) so that every
    /// offset still refers to the original snapshot when it is used.
    ///
    /// # Errors
    /// Returns error if an edit is out of bounds
    pub fn apply(&self, source: &str) -> Result<String, RewriteError> {
        self.validate(source)?;

        let mut result = source.to_owned();
        for op in self.ops.iter().rev() {
            let range = op.range();
            result.replace_range(range.start..range.end, op.replacement());
        }
        Ok(result)
    }
}

/// Safe code rewriter using byte ranges
///
/// Collects proposed edits for one snapshot, merges them through
/// [`EditSet::merge`] and applies the result.
#[derive(Debug, Clone)]
pub struct ByteRangeRewriter {
    /// Original source code
    source: String,
    /// Pending edits
    edits: Vec<EditOp>,
}

impl ByteRangeRewriter {
    /// Create a new rewriter for the given source
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            edits: Vec::new(),
        }
    }

    /// Add an edit to the pending list
    pub fn add_edit(&mut self, edit: EditOp) {
        self.edits.push(edit);
    }

    /// Add multiple edits
    pub fn add_edits(&mut self, edits: impl IntoIterator<Item = EditOp>) {
        self.edits.extend(edits);
    }

    /// Get the number of pending edits
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    /// Merge and validate pending edits without applying them
    ///
    /// # Errors
    /// Returns error if edits conflict or are out of bounds
    pub fn merged(&self) -> Result<EditSet, RewriteError> {
        let set = EditSet::merge(self.edits.iter().cloned())?;
        set.validate(&self.source)?;
        Ok(set)
    }

    /// Apply all edits and return the modified source
    ///
    /// # Errors
    /// Returns error if edits conflict or are out of bounds
    pub fn apply(self) -> Result<String, RewriteError> {
        let set = EditSet::merge(self.edits)?;
        set.apply(&self.source)
    }
}

/// Builder for constructing multiple edits
#[derive(Debug, Default)]
pub struct EditBuilder {
    edits: Vec<EditOp>,
}

impl EditBuilder {
    /// Create a new edit builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a replacement edit
    #[must_use]
    pub fn replace(mut self, start_byte: usize, end_byte: usize, text: impl Into<String>) -> Self {
        self.edits.push(EditOp::replace(start_byte, end_byte, text));
        self
    }

    /// Add a deletion edit
    #[must_use]
    pub fn delete(mut self, start_byte: usize, end_byte: usize) -> Self {
        self.edits.push(EditOp::delete(start_byte, end_byte));
        self
    }

    /// Add an insertion edit
    #[must_use]
    pub fn insert(mut self, position: usize, text: impl Into<String>) -> Self {
        self.edits.push(EditOp::insert(position, text));
        self
    }

    /// Build the list of edits
    #[must_use]
    pub fn build(self) -> Vec<EditOp> {
        self.edits
    }
}
