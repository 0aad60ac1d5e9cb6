//! Read-only summary of the names a file declares.

use crate::cst::{SyntaxNode, SyntaxTree};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;

/// Variable and function names declared anywhere in a file.
///
/// Each group keeps first-discovery order and holds every name once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeclarationSummary {
    /// Names bound by variable declarators, destructuring included.
    pub variable_names: Vec<String>,
    /// Names of function and generator declarations.
    pub function_names: Vec<String>,
}

impl DeclarationSummary {
    /// Collect declared names from `tree`.
    #[must_use]
    pub fn collect(tree: &SyntaxTree) -> Self {
        let mut variables = NameSet::default();
        let mut functions = NameSet::default();
        tree.walk(&mut |node, _| match node.kind {
            "variable_declarator" => {
                if let Some(name) = node.child_by_field("name") {
                    pattern_names(name, &tree.source, &mut variables);
                }
            }
            "function_declaration" | "generator_function_declaration" => {
                if let Some(name) = node.child_by_field("name") {
                    functions.insert(name.text(&tree.source));
                }
            }
            _ => {}
        });
        Self {
            variable_names: variables.names,
            function_names: functions.names,
        }
    }

    /// Whether the file declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variable_names.is_empty() && self.function_names.is_empty()
    }
}

impl fmt::Display for DeclarationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn group(names: &[String]) -> String {
            if names.is_empty() {
                "None".to_owned()
            } else {
                names.join(", ")
            }
        }
        write!(
            f,
            "Variables: {} | Functions: {}",
            group(&self.variable_names),
            group(&self.function_names)
        )
    }
}

/// Summarize the declarations of an already parsed file.
#[must_use]
pub fn summarize_declarations(tree: &SyntaxTree) -> DeclarationSummary {
    DeclarationSummary::collect(tree)
}

#[derive(Default)]
struct NameSet {
    seen: FxHashSet<String>,
    names: Vec<String>,
}

impl NameSet {
    fn insert(&mut self, name: &str) {
        if !name.is_empty() && self.seen.insert(name.to_owned()) {
            self.names.push(name.to_owned());
        }
    }
}

fn pattern_names(node: &SyntaxNode, source: &str, out: &mut NameSet) {
    match node.kind {
        "identifier" | "shorthand_property_identifier_pattern" => out.insert(node.text(source)),
        "pair_pattern" => {
            if let Some(value) = node.child_by_field("value") {
                pattern_names(value, source, out);
            }
        }
        "object_assignment_pattern" | "assignment_pattern" => {
            if let Some(left) = node.child_by_field("left") {
                pattern_names(left, source, out);
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" => {
            for child in node.named_children() {
                pattern_names(child, source, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse;

    #[test]
    fn test_summary_groups() {
        let tree = parse(
            "const a = 1, { b, c: d } = o;\nfunction f() { let a = 2; }\nfunction* g() {}\n",
            "x.js",
        )
        .unwrap();
        let summary = summarize_declarations(&tree);
        assert_eq!(summary.variable_names, vec!["a", "b", "d"]);
        assert_eq!(summary.function_names, vec!["f", "g"]);
        assert_eq!(summary.to_string(), "Variables: a, b, d | Functions: f, g");
    }

    #[test]
    fn test_summary_empty_groups() {
        let tree = parse("console.log(1);\n", "x.js").unwrap();
        let summary = summarize_declarations(&tree);
        assert!(summary.is_empty());
        assert_eq!(summary.to_string(), "Variables: None | Functions: None");
    }
}
