//! Tree-sitter based parser for JavaScript and TypeScript source code.
//!
//! Provides precise byte-range information for safe code rewriting.

use tree_sitter::{Parser, TreeCursor};

use super::language::SourceLanguage;
use crate::constants::MAX_NESTING_DEPTH;

/// Node kind used by tree-sitter for comments (trivia).
const COMMENT_KIND: &str = "comment";

/// A half-open byte range `[start, end)` into one text snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize)]
pub struct TextRange {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl TextRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty range at `offset`.
    #[must_use]
    pub const fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether `other` lies entirely within this range.
    #[must_use]
    pub const fn contains_range(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the two ranges share at least one byte.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for TextRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A point in source code (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    /// Zero-indexed row number
    pub row: usize,
    /// Zero-indexed column (byte offset within line)
    pub column: usize,
}

impl From<tree_sitter::Point> for Point {
    fn from(p: tree_sitter::Point) -> Self {
        Self {
            row: p.row,
            column: p.column,
        }
    }
}

/// A syntax node with exact source location.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    /// Node kind (e.g., "import_statement", "identifier")
    pub kind: &'static str,
    /// Field name this node occupies in its parent (e.g., "name", "value")
    pub field: Option<&'static str>,
    /// Whether this is a named node (vs anonymous like punctuation)
    pub is_named: bool,
    /// Whether this is an error or a missing node inserted by error recovery
    pub is_error: bool,
    /// Trimmed range, excluding leading trivia
    pub range: TextRange,
    /// Start of the full range: end of the previous non-trivia token
    pub full_start: usize,
    /// Start point (row, column)
    pub start_point: Point,
    /// Child nodes, in source order
    pub children: Vec<SyntaxNode>,
}

/// A node whose children are still being collected.
struct OpenNode {
    node: SyntaxNode,
    /// End of the last non-trivia child seen so far.
    previous_end: usize,
}

impl OpenNode {
    fn enter(cursor: &TreeCursor<'_>, full_start: usize) -> Self {
        let node = cursor.node();
        let start = node.start_byte();
        let full_start = full_start.min(start);
        Self {
            node: SyntaxNode {
                kind: node.kind(),
                field: cursor.field_name(),
                is_named: node.is_named(),
                is_error: node.is_error() || node.is_missing(),
                range: TextRange::new(start, node.end_byte()),
                full_start,
                start_point: node.start_position().into(),
                children: Vec::new(),
            },
            previous_end: full_start,
        }
    }
}

impl SyntaxNode {
    /// Copy the tree under `cursor` without recursing, refusing trees nested
    /// deeper than [`MAX_NESTING_DEPTH`].
    fn build(cursor: &mut TreeCursor<'_>) -> Result<Self, ParseFailure> {
        let mut stack = vec![OpenNode::enter(cursor, 0)];
        loop {
            if cursor.goto_first_child() {
                if stack.len() >= MAX_NESTING_DEPTH {
                    return Err(ParseFailure::TooDeep {
                        limit: MAX_NESTING_DEPTH,
                    });
                }
                let full_start = stack.last().map_or(0, |open| open.previous_end);
                stack.push(OpenNode::enter(cursor, full_start));
                continue;
            }

            // Close finished nodes until one has a next sibling.
            loop {
                let Some(done) = stack.pop().map(|open| open.node) else {
                    return Err(ParseFailure::NoTree("empty cursor".to_owned()));
                };
                let Some(parent) = stack.last_mut() else {
                    return Ok(done);
                };
                if done.kind != COMMENT_KIND {
                    parent.previous_end = done.range.end;
                }
                parent.node.children.push(done);
                let full_start = parent.previous_end;

                if cursor.goto_next_sibling() {
                    stack.push(OpenNode::enter(cursor, full_start));
                    break;
                }
                cursor.goto_parent();
            }
        }
    }

    /// The full range, including leading whitespace and comments.
    #[must_use]
    pub const fn full_range(&self) -> TextRange {
        TextRange::new(self.full_start, self.range.end)
    }

    /// Source text covered by the trimmed range.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.range.start..self.range.end).unwrap_or("")
    }

    /// First child stored under the given field name.
    #[must_use]
    pub fn child_by_field(&self, field: &str) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.field == Some(field))
    }

    /// Named children that are not comments.
    pub fn named_children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children
            .iter()
            .filter(|c| c.is_named && c.kind != COMMENT_KIND)
    }

    /// First direct child with the given kind.
    #[must_use]
    pub fn child_of_kind(&self, kind: &str) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Find the smallest node containing the given byte range
    #[must_use]
    pub fn find_smallest_covering(&self, start: usize, end: usize) -> Option<&SyntaxNode> {
        if !(self.range.start <= start && self.range.end >= end) {
            return None;
        }

        let mut current = self;
        while let Some(child) = current
            .children
            .iter()
            .find(|c| c.range.start <= start && c.range.end >= end)
        {
            current = child;
        }
        Some(current)
    }

    /// Find all nodes of a specific kind
    #[must_use]
    pub fn find_by_kind(&self, kind: &str) -> Vec<&SyntaxNode> {
        let mut result = Vec::new();
        self.walk(&mut |node, _| {
            if node.kind == kind {
                result.push(node);
            }
        });
        result
    }

    /// Depth-first, pre-order traversal handing each node its parent.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a SyntaxNode, Option<&'a SyntaxNode>),
    {
        let mut pending: Vec<(&'a SyntaxNode, Option<&'a SyntaxNode>)> = vec![(self, None)];
        while let Some((node, parent)) = pending.pop() {
            visit(node, parent);
            pending.extend(node.children.iter().rev().map(|child| (child, Some(node))));
        }
    }
}

/// A parsed syntax tree together with the snapshot it describes.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    /// Root node (kind `program`)
    pub root: SyntaxNode,
    /// Original source code
    pub source: String,
    /// Grammar used to parse the source
    pub language: SourceLanguage,
    error_count: usize,
}

impl SyntaxTree {
    /// Extract a slice of source code by byte range
    #[must_use]
    pub fn slice(&self, range: TextRange) -> &str {
        self.source.get(range.start..range.end).unwrap_or("")
    }

    /// Source text of a node.
    #[must_use]
    pub fn text(&self, node: &SyntaxNode) -> &str {
        node.text(&self.source)
    }

    /// Whether error recovery was needed anywhere in the tree.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Number of error and missing nodes.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Top-level statements of the program, without comments.
    pub fn statements(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.root.named_children()
    }

    /// Pre-order traversal of the whole tree.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a SyntaxNode, Option<&'a SyntaxNode>),
    {
        self.root.walk(visit);
    }
}

/// Raised only when no tree can be produced at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    /// The grammar could not be loaded into the parser
    #[error("failed to load {language} grammar: {message}")]
    Grammar {
        /// Language that failed
        language: &'static str,
        /// Loader message
        message: String,
    },
    /// The parser returned no tree (cancelled or timed out)
    #[error("parser produced no tree for {0}")]
    NoTree(String),
    /// The tree nests deeper than the engine will traverse
    #[error("source nests deeper than {limit} levels")]
    TooDeep {
        /// Deepest nesting accepted
        limit: usize,
    },
}

/// Tree-sitter based parser, reusable across snapshots of one language.
pub struct SourceParser {
    parser: Parser,
    language: SourceLanguage,
}

impl SourceParser {
    /// Create a new parser for the given language.
    ///
    /// # Errors
    /// Returns error if the grammar cannot be loaded
    pub fn new(language: SourceLanguage) -> Result<Self, ParseFailure> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.grammar())
            .map_err(|e| ParseFailure::Grammar {
                language: language.as_str(),
                message: e.to_string(),
            })?;
        Ok(Self { parser, language })
    }

    /// Language this parser was created for.
    #[must_use]
    pub fn language(&self) -> SourceLanguage {
        self.language
    }

    /// Parse source code into a syntax tree.
    ///
    /// Malformed input still yields a tree; check [`SyntaxTree::has_errors`].
    ///
    /// # Errors
    /// Returns error if the parser yields no tree at all
    #[tracing::instrument(level = "trace", skip_all, fields(language = self.language.as_str(), len = source.len()))]
    pub fn parse(&mut self, source: &str) -> Result<SyntaxTree, ParseFailure> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ParseFailure::NoTree(self.language.as_str().to_owned()))?;

        let mut cursor = tree.walk();
        let root = SyntaxNode::build(&mut cursor)?;

        let mut error_count = 0;
        root.walk(&mut |node, _| {
            if node.is_error {
                error_count += 1;
            }
        });
        if error_count > 0 {
            tracing::debug!(error_count, "parsed with error recovery");
        }

        Ok(SyntaxTree {
            root,
            source: source.to_owned(),
            language: self.language,
            error_count,
        })
    }
}

/// Parse `text`, choosing the grammar from `file_identity`.
///
/// # Errors
/// Returns error only if no tree can be produced
pub fn parse(text: &str, file_identity: &str) -> Result<SyntaxTree, ParseFailure> {
    SourceParser::new(SourceLanguage::from_identity(file_identity))?.parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_import() {
        let source = "import x from \"m\";\nx();\n";
        let tree = parse(source, "a.js").unwrap();

        assert_eq!(tree.root.kind, "program");
        let imports = tree.root.find_by_kind("import_statement");
        assert_eq!(imports.len(), 1);
        assert!(!tree.has_errors());
    }

    #[test]
    fn test_byte_ranges_accurate() {
        let source = "let x = 1;";
        let tree = parse(source, "a.js").unwrap();

        let decl = tree.statements().next().unwrap();
        assert_eq!(decl.kind, "lexical_declaration");
        assert_eq!(decl.range, TextRange::new(0, source.len()));
        assert_eq!(tree.text(decl), source);
    }

    #[test]
    fn test_full_range_includes_leading_trivia() {
        let source = "let a = 1;\n// note\nlet b = 2;";
        let tree = parse(source, "a.js").unwrap();

        let second = tree.statements().nth(1).unwrap();
        assert_eq!(tree.text(second), "let b = 2;");
        assert_eq!(second.full_start, "let a = 1;".len());
        assert_eq!(tree.slice(second.full_range()), "\n// note\nlet b = 2;");
    }

    #[test]
    fn test_fields_recorded() {
        let source = "const answer = 42;";
        let tree = parse(source, "a.js").unwrap();

        let declarator = tree.root.find_by_kind("variable_declarator")[0];
        let name = declarator.child_by_field("name").unwrap();
        assert_eq!(name.kind, "identifier");
        assert_eq!(tree.text(name), "answer");
        assert_eq!(tree.text(declarator.child_by_field("value").unwrap()), "42");
    }

    #[test]
    fn test_malformed_input_still_parses() {
        let source = "import { a, from \"m\";\nfunction (";
        let tree = parse(source, "broken.ts").unwrap();
        assert!(tree.has_errors());
        assert!(tree.error_count() > 0);
    }

    #[test]
    fn test_typescript_grammar_selected() {
        let source = "let n: number = 1;";
        let tree = parse(source, "a.ts").unwrap();
        assert_eq!(tree.language, SourceLanguage::TypeScript);
        assert!(!tree.has_errors());
        assert_eq!(tree.root.find_by_kind("type_annotation").len(), 1);
    }

    #[test]
    fn test_deep_nesting_is_refused_not_overflowed() {
        let depth = 10_000;
        let source = format!("let x = {}1{};", "[".repeat(depth), "]".repeat(depth));
        let result = parse(&source, "deep.js");
        assert_eq!(
            result.unwrap_err(),
            ParseFailure::TooDeep {
                limit: MAX_NESTING_DEPTH
            }
        );
    }

    #[test]
    fn test_moderate_nesting_parses() {
        let source = format!("let x = {}1{};", "[".repeat(100), "]".repeat(100));
        let tree = parse(&source, "nested.js").unwrap();
        assert!(!tree.has_errors());
        assert_eq!(tree.root.find_by_kind("array").len(), 100);
    }

    #[test]
    fn test_walk_is_pre_order() {
        let tree = parse("a(b);", "a.js").unwrap();
        let mut kinds = Vec::new();
        tree.walk(&mut |node, parent| {
            if node.is_named {
                kinds.push((node.kind, parent.map(|p| p.kind)));
            }
        });
        assert_eq!(
            kinds,
            [
                ("program", None),
                ("expression_statement", Some("program")),
                ("call_expression", Some("expression_statement")),
                ("identifier", Some("call_expression")),
                ("arguments", Some("call_expression")),
                ("identifier", Some("arguments")),
            ]
        );
    }

    #[test]
    fn test_find_smallest_covering() {
        let source = "function f() {\n  return value;\n}\n";
        let tree = parse(source, "a.js").unwrap();
        let start = source.find("value").unwrap();
        let node = tree.root.find_smallest_covering(start, start + 5).unwrap();
        assert_eq!(node.kind, "identifier");
    }
}
