//! Edit coordinator.
//!
//! Rules propose [`EditOp`]s against one text snapshot. This module merges
//! them into an [`EditSet`] (sorted, non-overlapping, with nested edits under
//! a deletion superseded) and applies the set in one reverse pass so that
//! every offset is still valid when it is used.

mod rewriter;

pub use rewriter::{ByteRangeRewriter, ConflictError, EditBuilder, EditOp, EditSet, RewriteError};
