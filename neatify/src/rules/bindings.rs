//! Mutable-binding modernizer.
//!
//! Only `var` statements at the top level of a module or function body are
//! converted. Declarations in nested blocks, loop heads and single-statement
//! bodies keep `var`: there `let` would narrow the binding's scope or is not
//! allowed at all. Each skipped statement is listed in the rule's summary.

use crate::constants::BLOCK_SCOPED_KEYWORD;
use crate::cst::SyntaxNode;
use crate::fix::{ConflictError, EditOp, EditSet};
use crate::rules::{Proposal, Rule, RuleContext, RuleId, RuleResult};
use crate::semantic::BindingKind;

/// Replaces `var` with `let` where block scoping cannot change meaning.
pub struct VarToLetRule;

impl Rule for VarToLetRule {
    fn id(&self) -> RuleId {
        RuleId::Bindings
    }

    fn name(&self) -> &'static str {
        "VarToLetRule"
    }

    fn propose(&self, context: &RuleContext<'_>) -> Proposal {
        let mut proposal = Proposal::default();
        context.tree.walk(&mut |node, parent| {
            if node.kind != "variable_declaration" {
                return;
            }
            let Some(keyword) = node.children.first().filter(|k| k.kind == "var") else {
                return;
            };
            match check_declaration(node, parent, context) {
                Ok(()) => {
                    proposal.edits.push(EditOp::replace(
                        keyword.range.start,
                        keyword.range.end,
                        BLOCK_SCOPED_KEYWORD,
                    ));
                    proposal.count += 1;
                    proposal
                        .changes
                        .push(format!("line {}", node.start_point.row + 1));
                }
                Err(reason) => {
                    let line = node.start_point.row + 1;
                    tracing::debug!(line, reason, "kept 'var'");
                    proposal.skipped.push(format!("Kept 'var' on line {line}: {reason}"));
                }
            }
        });
        proposal
    }

    fn headline(&self, proposal: &Proposal) -> String {
        if proposal.count == 0 {
            "No 'var' declarations found.".to_owned()
        } else {
            format!("Converted {} 'var' to 'let'.", proposal.count)
        }
    }
}

/// Find `var` declarations and merge their keyword replacements into an edit set.
///
/// # Errors
/// Returns error if the proposed edits conflict
pub fn find_var_declarations(
    context: &RuleContext<'_>,
) -> Result<(EditSet, RuleResult), ConflictError> {
    VarToLetRule.check(context)
}

fn check_declaration(
    node: &SyntaxNode,
    parent: Option<&SyntaxNode>,
    context: &RuleContext<'_>,
) -> Result<(), &'static str> {
    // `let` is not allowed as a single-statement body and would narrow a
    // loop or block scope.
    let parent_kind = parent.map_or("program", |p| p.kind);
    if !matches!(parent_kind, "program" | "statement_block" | "export_statement") {
        return Err("not at the top of a function or module");
    }
    let scopes = context.scopes;
    if !scopes.scope(scopes.scope_at(node.range.start)).kind.is_function_like() {
        return Err("inside a nested block");
    }

    let mut names = Vec::new();
    collect_declared_names(node, &mut names);
    for name in names {
        let Some(id) = scopes.binding_at(name.range) else {
            continue;
        };
        let binding = scopes.binding(id);
        if binding.kind != BindingKind::Var || binding.declarations.len() > 1 {
            return Err("name is declared more than once");
        }
        if scopes
            .references_to(id)
            .any(|r| r.range.start < node.range.end)
        {
            return Err("name is used before its declaration");
        }
    }
    Ok(())
}

fn collect_declared_names<'a>(node: &'a SyntaxNode, out: &mut Vec<&'a SyntaxNode>) {
    for declarator in node.children.iter().filter(|c| c.kind == "variable_declarator") {
        if let Some(name) = declarator.child_by_field("name") {
            name.walk(&mut |n, _| {
                // Default values are uses; `binding_at` skips them later.
                if matches!(n.kind, "identifier" | "shorthand_property_identifier_pattern") {
                    out.push(n);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse;
    use crate::rules::RuleSettings;
    use crate::semantic::{ScopeTree, UsageIndex};

    fn run(source: &str) -> (String, RuleResult) {
        let tree = parse(source, "test.js").unwrap();
        let usage = UsageIndex::build(&tree);
        let scopes = ScopeTree::build(&tree);
        let settings = RuleSettings::default();
        let context = RuleContext {
            tree: &tree,
            usage: &usage,
            scopes: &scopes,
            settings: &settings,
        };
        let (set, result) = find_var_declarations(&context).unwrap();
        (set.apply(source).unwrap(), result)
    }

    #[test]
    fn test_converts_var() {
        let (out, result) = run("var a = 1;");
        assert_eq!(out, "let a = 1;");
        assert_eq!(result.summary(), "Converted 1 'var' to 'let'.");
        let (again, second) = run(&out);
        assert_eq!(again, out);
        assert_eq!(second.count, 0);
        assert_eq!(second.summary(), "No 'var' declarations found.");
    }

    #[test]
    fn test_function_body_converted() {
        let (out, _) = run("function f() {\n  var x = 1, { y } = o;\n  return x + y;\n}\n");
        assert_eq!(out, "function f() {\n  let x = 1, { y } = o;\n  return x + y;\n}\n");
    }

    #[test]
    fn test_nested_block_kept() {
        let source = "function f(c) {\n  if (c) { var v = 1; }\n  return v;\n}\n";
        let (out, result) = run(source);
        assert_eq!(out, source);
        assert_eq!(result.summary_lines.len(), 2);
    }

    #[test]
    fn test_loop_head_kept() {
        let source = "for (var i = 0; i < 3; i++) {}\n";
        let (out, _) = run(source);
        assert_eq!(out, source);
    }

    #[test]
    fn test_redeclaration_kept() {
        let source = "var n = 1;\nvar n = 2;\n";
        let (out, result) = run(source);
        assert_eq!(out, source);
        assert_eq!(result.count, 0);
    }

    #[test]
    fn test_parameter_redeclaration_kept() {
        let source = "function f(p) { var p = 2; return p; }\n";
        let (out, _) = run(source);
        assert_eq!(out, source);
    }

    #[test]
    fn test_use_before_declaration_kept() {
        let source = "log(total);\nvar total = 3;\n";
        let (out, _) = run(source);
        assert_eq!(out, source);
    }

    #[test]
    fn test_exported_var_converted() {
        let (out, _) = run("export var api = {};\n");
        assert_eq!(out, "export let api = {};\n");
    }
}
