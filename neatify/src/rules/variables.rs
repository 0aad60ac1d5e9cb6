//! Unused-variable eliminator.

use crate::cst::{SyntaxNode, TextRange};
use crate::fix::{ConflictError, EditOp, EditSet};
use crate::rules::{Proposal, Rule, RuleContext, RuleId, RuleResult};
use crate::semantic::BindingId;
use rustc_hash::FxHashSet;

/// Parents whose children are whole statements that can be deleted.
const STATEMENT_LISTS: &[&str] = &[
    "program",
    "statement_block",
    "switch_case",
    "switch_default",
    "export_statement",
];

/// Removes variable declarators whose binding is never referenced.
pub struct UnusedVariableRule;

impl Rule for UnusedVariableRule {
    fn id(&self) -> RuleId {
        RuleId::UnusedVariables
    }

    fn name(&self) -> &'static str {
        "UnusedVariableRule"
    }

    fn propose(&self, context: &RuleContext<'_>) -> Proposal {
        let statements = collect_statements(context);
        let removed = removable_declarators(&statements, context);

        let mut proposal = Proposal::default();
        for statement in &statements {
            let unused: Vec<&Candidate<'_>> = statement
                .declarators
                .iter()
                .filter(|d| d.binding.is_some_and(|id| removed.contains(&id)))
                .collect();
            if unused.is_empty() {
                continue;
            }
            proposal.count += unused.len();
            proposal
                .changes
                .extend(unused.iter().map(|d| d.name.to_owned()));

            if unused.len() == statement.declarators.len() {
                proposal.edits.push(EditOp::Delete {
                    range: statement.outer.full_range(),
                });
            } else {
                proposal
                    .edits
                    .extend(declarator_deletions(&statement.declarators, &removed));
            }
        }
        proposal
    }

    fn headline(&self, proposal: &Proposal) -> String {
        if proposal.count == 0 {
            "No unused variables found!".to_owned()
        } else {
            format!("Removed {} unused variable(s).", proposal.count)
        }
    }
}

/// Find unused variables and merge the removals into an edit set.
///
/// # Errors
/// Returns error if the proposed edits conflict
pub fn find_unused_variables(
    context: &RuleContext<'_>,
) -> Result<(EditSet, RuleResult), ConflictError> {
    UnusedVariableRule.check(context)
}

struct Candidate<'a> {
    node: &'a SyntaxNode,
    name: &'a str,
    /// `None` when the declarator is not a removable simple name.
    binding: Option<BindingId>,
}

struct DeclarationStatement<'a> {
    /// What gets deleted when every declarator goes: the declaration or its export.
    outer: &'a SyntaxNode,
    declarators: Vec<Candidate<'a>>,
}

fn collect_statements<'a>(context: &RuleContext<'a>) -> Vec<DeclarationStatement<'a>> {
    let source = context.source();
    let mut statements = Vec::new();
    context.tree.walk(&mut |node, parent| {
        if !matches!(node.kind, "lexical_declaration" | "variable_declaration") {
            return;
        }
        // Loop heads, single-statement bodies and ambient declarations stay.
        let Some(parent) = parent.filter(|p| STATEMENT_LISTS.contains(&p.kind)) else {
            return;
        };
        let exported = parent.kind == "export_statement";
        let outer = if exported { parent } else { node };

        let declarators = node
            .children
            .iter()
            .filter(|c| c.kind == "variable_declarator")
            .map(|declarator| {
                let name = declarator.child_by_field("name");
                let binding = name
                    .filter(|n| n.kind == "identifier")
                    .filter(|n| !context.settings.is_ignored(n.text(source)))
                    .and_then(|n| context.scopes.binding_at(n.range))
                    .filter(|&id| {
                        let binding = context.scopes.binding(id);
                        binding.kind.is_variable()
                            && !(binding.exported && context.settings.keep_exported)
                    });
                Candidate {
                    node: declarator,
                    name: name.map_or("", |n| n.text(source)),
                    binding,
                }
            })
            .collect();

        statements.push(DeclarationStatement {
            outer,
            declarators,
        });
    });
    statements
}

/// Bindings whose every reference sits inside another removed declarator.
///
/// Iterates to a fixed point so `let a = 1; let b = a;` loses both in one run.
fn removable_declarators(
    statements: &[DeclarationStatement<'_>],
    context: &RuleContext<'_>,
) -> FxHashSet<BindingId> {
    let candidates: Vec<&Candidate<'_>> = statements
        .iter()
        .flat_map(|s| s.declarators.iter())
        .filter(|d| d.binding.is_some())
        .collect();

    let mut removed = FxHashSet::default();
    let mut removed_spans: Vec<TextRange> = Vec::new();
    loop {
        let mut changed = false;
        for candidate in &candidates {
            let Some(id) = candidate.binding else {
                continue;
            };
            if removed.contains(&id) {
                continue;
            }
            let live = context
                .scopes
                .references_to(id)
                .any(|r| !removed_spans.iter().any(|span| span.contains_range(&r.range)));
            if !live {
                removed.insert(id);
                // A redeclared `var` drops every declarator of the binding.
                removed_spans.extend(
                    candidates
                        .iter()
                        .filter(|c| c.binding == Some(id))
                        .map(|c| c.node.range),
                );
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    removed
}

/// One deletion per run of removed declarators, taking one separator along:
/// back to the previous kept declarator, or up to the next kept one when the
/// run leads the list. Kept declarators are never covered, so edits nested in
/// their initializers stay disjoint.
fn declarator_deletions(
    declarators: &[Candidate<'_>],
    removed: &FxHashSet<BindingId>,
) -> Vec<EditOp> {
    let is_removed = |d: &Candidate<'_>| d.binding.is_some_and(|id| removed.contains(&id));

    let mut edits = Vec::new();
    let mut kept_end: Option<usize> = None;
    let mut run: Option<TextRange> = None;
    for declarator in declarators {
        let range = declarator.node.range;
        if is_removed(declarator) {
            run = Some(run.map_or(range, |r| TextRange::new(r.start, range.end)));
            continue;
        }
        if let Some(run) = run.take() {
            edits.push(match kept_end {
                Some(end) => EditOp::delete(end, run.end),
                None => EditOp::delete(run.start, range.start),
            });
        }
        kept_end = Some(range.end);
    }
    if let (Some(run), Some(end)) = (run, kept_end) {
        edits.push(EditOp::delete(end, run.end));
    }
    edits
}
