//! Name-based identifier usage index.

use crate::cst::{SyntaxNode, SyntaxTree, TextRange};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Leaf kinds that carry an identifier name.
pub(crate) const IDENTIFIER_KINDS: &[&str] = &[
    "identifier",
    "type_identifier",
    "shorthand_property_identifier",
    "shorthand_property_identifier_pattern",
];

/// Whether an identifier occurrence declares a name or uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The position where an import, variable or function name is declared.
    BindingIntroduction,
    /// Any other occurrence of the name.
    Reference,
}

/// One identifier leaf in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierOccurrence {
    /// Identifier text.
    pub name: String,
    /// Byte range of the leaf.
    pub range: TextRange,
    /// Declaration or use.
    pub role: Role,
}

/// Per-file usage facts keyed by identifier text.
///
/// Names are not scoped: two unrelated bindings with the same name share one
/// entry. [`crate::semantic::ScopeTree`] is the scope-aware counterpart.
#[derive(Debug, Clone, Default)]
pub struct UsageIndex {
    occurrences: Vec<IdentifierOccurrence>,
    references: FxHashMap<String, Vec<usize>>,
}

impl UsageIndex {
    /// Build the index with one depth-first traversal of `tree`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(tree: &SyntaxTree) -> Self {
        let mut index = Self::default();
        tree.walk(&mut |node, parent| {
            if !IDENTIFIER_KINDS.contains(&node.kind) {
                return;
            }
            let role = classify(node, parent);
            let name = tree.text(node).to_owned();
            let position = index.occurrences.len();
            if role == Role::Reference {
                index
                    .references
                    .entry(name.clone())
                    .or_default()
                    .push(position);
            }
            index.occurrences.push(IdentifierOccurrence {
                name,
                range: node.range,
                role,
            });
        });
        tracing::debug!(
            occurrences = index.occurrences.len(),
            names = index.references.len(),
            "usage index built"
        );
        index
    }

    /// Number of reference occurrences of `name`.
    #[must_use]
    pub fn reference_count(&self, name: &str) -> usize {
        self.references.get(name).map_or(0, Vec::len)
    }

    /// Whether `name` is referenced at least once.
    #[must_use]
    pub fn is_referenced(&self, name: &str) -> bool {
        self.reference_count(name) > 0
    }

    /// Reference occurrences of `name` in source order.
    pub fn references_to<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = &'a IdentifierOccurrence> + 'a {
        self.references
            .get(name)
            .into_iter()
            .flatten()
            .map(|&i| &self.occurrences[i])
    }

    /// Every identifier occurrence in source order.
    #[must_use]
    pub fn occurrences(&self) -> &[IdentifierOccurrence] {
        &self.occurrences
    }

    /// Whether the literal name appears anywhere in the file, declared or used.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.occurrences.iter().any(|o| o.name == name)
    }
}

/// Convenience wrapper for [`UsageIndex::build`].
#[must_use]
pub fn build_usage_index(tree: &SyntaxTree) -> UsageIndex {
    UsageIndex::build(tree)
}

fn classify(node: &SyntaxNode, parent: Option<&SyntaxNode>) -> Role {
    let Some(parent) = parent else {
        return Role::Reference;
    };
    let declares = match parent.kind {
        "import_clause" | "import_specifier" | "namespace_import" | "import_require_clause" => {
            true
        }
        "variable_declarator" => node.field == Some("name"),
        "function_declaration" | "generator_function_declaration" | "function_signature" => {
            node.field == Some("name")
        }
        _ => false,
    };
    if declares {
        Role::BindingIntroduction
    } else {
        Role::Reference
    }
}
