//! CST (Concrete Syntax Tree) module: the parser adapter.
//!
//! This module turns JavaScript/TypeScript source text into an owned,
//! immutable [`SyntaxTree`] using Tree-sitter grammars:
//! - Precise byte ranges for every node (trimmed and full, with leading trivia)
//! - Field names so rules can address `name`, `value`, `alias` positions
//! - Best-effort trees for malformed input (error nodes are kept and flagged)
//!
//! # Design Principles
//!
//! - **Parse never fails on bad code**: the user may be mid-edit
//! - **Byte-range anchored**: every rule edits by byte offsets into one snapshot
//! - **Immutable**: a change to the text means a fresh tree

mod language;
mod parser;

pub use language::SourceLanguage;
pub use parser::{parse, ParseFailure, Point, SourceParser, SyntaxNode, SyntaxTree, TextRange};
