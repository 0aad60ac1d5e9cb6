//! Unused-import eliminator.

use crate::cst::{SyntaxNode, TextRange};
use crate::fix::{ConflictError, EditOp, EditSet};
use crate::rules::{Proposal, Rule, RuleContext, RuleId, RuleResult};
use crate::semantic::import_local_name;

/// Removes import bindings whose local name is never referenced.
pub struct UnusedImportRule;

impl Rule for UnusedImportRule {
    fn id(&self) -> RuleId {
        RuleId::UnusedImports
    }

    fn name(&self) -> &'static str {
        "UnusedImportRule"
    }

    fn propose(&self, context: &RuleContext<'_>) -> Proposal {
        let mut proposal = Proposal::default();
        for statement in context.tree.statements() {
            if statement.kind == "import_statement" {
                check_import(statement, context, &mut proposal);
            }
        }
        proposal
    }

    fn headline(&self, proposal: &Proposal) -> String {
        if proposal.changes.is_empty() {
            "No unused imports found!".to_owned()
        } else {
            format!(
                "Removed unused import(s): {}",
                proposal.changes.join(" | ")
            )
        }
    }
}

/// Find unused imports and merge the removals into an edit set.
///
/// # Errors
/// Returns error if the proposed edits conflict
pub fn find_unused_imports(
    context: &RuleContext<'_>,
) -> Result<(EditSet, RuleResult), ConflictError> {
    UnusedImportRule.check(context)
}

/// One binding introduced by an import clause.
struct ImportBinding<'a> {
    /// The clause part: default identifier, namespace import or specifier.
    part: &'a SyntaxNode,
    name: &'a str,
    used: bool,
}

fn check_import(statement: &SyntaxNode, context: &RuleContext<'_>, proposal: &mut Proposal) {
    // Side-effect imports and `import x = require()` bind nothing we track.
    let Some(clause) = statement.child_of_kind("import_clause") else {
        return;
    };
    let source = context.source();
    let is_used = |local: &SyntaxNode| {
        let name = local.text(source);
        context.usage.is_referenced(name) || context.settings.is_ignored(name)
    };

    let mut default = None;
    let mut namespace = None;
    let mut named_list = None;
    let mut specifiers = Vec::new();
    for part in clause.named_children() {
        match part.kind {
            "identifier" => {
                default = Some(ImportBinding {
                    part,
                    name: part.text(source),
                    used: is_used(part),
                });
            }
            "namespace_import" => {
                if let Some(local) = part.child_of_kind("identifier") {
                    namespace = Some(ImportBinding {
                        part,
                        name: local.text(source),
                        used: is_used(local),
                    });
                }
            }
            "named_imports" => {
                named_list = Some(part);
                for spec in part.named_children() {
                    let Some(local) = import_local_name(spec) else {
                        continue;
                    };
                    specifiers.push(ImportBinding {
                        part: spec,
                        name: local.text(source),
                        used: is_used(local),
                    });
                }
            }
            _ => {}
        }
    }

    let bindings: Vec<&ImportBinding<'_>> = default
        .iter()
        .chain(namespace.iter())
        .chain(specifiers.iter())
        .collect();
    if bindings.is_empty() || bindings.iter().all(|b| b.used) {
        return;
    }

    let removed: Vec<String> = bindings
        .iter()
        .filter(|b| !b.used)
        .map(|b| b.name.to_owned())
        .collect();
    tracing::trace!(statement = %statement.range, ?removed, "unused import bindings");
    proposal.count += removed.len();
    proposal.changes.extend(removed);

    if bindings.iter().all(|b| !b.used) {
        proposal.edits.push(EditOp::Delete {
            range: statement.full_range(),
        });
        return;
    }

    // What follows the default import: `, * as ns` or `, { ... }`.
    let rest = namespace
        .as_ref()
        .map(|ns| ns.part)
        .or(named_list);

    if let Some(default) = &default {
        if !default.used {
            if let Some(rest) = rest {
                proposal
                    .edits
                    .push(EditOp::delete(default.part.range.start, rest.range.start));
            }
        }
    }

    if let Some(ns) = &namespace {
        if !ns.used {
            // Only reached with a used default import.
            if let Some(default) = &default {
                proposal
                    .edits
                    .push(EditOp::delete(default.part.range.end, ns.part.range.end));
            }
        }
    }

    let kept: Vec<&ImportBinding<'_>> = specifiers.iter().filter(|s| s.used).collect();
    if kept.len() == specifiers.len() {
        return;
    }
    match (kept.is_empty(), &default, named_list) {
        (true, Some(default), Some(list)) => {
            proposal
                .edits
                .push(EditOp::delete(default.part.range.end, list.range.end));
        }
        (false, _, _) => {
            let (Some(first), Some(last)) = (specifiers.first(), specifiers.last()) else {
                return;
            };
            let span = TextRange::new(first.part.range.start, last.part.range.end);
            let text = kept
                .iter()
                .map(|s| s.part.text(source))
                .collect::<Vec<_>>()
                .join(", ");
            proposal.edits.push(EditOp::Replace { range: span, text });
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse;
    use crate::rules::RuleSettings;
    use crate::semantic::{ScopeTree, UsageIndex};

    fn run(source: &str) -> (String, RuleResult) {
        let tree = parse(source, "test.ts").unwrap();
        let usage = UsageIndex::build(&tree);
        let scopes = ScopeTree::build(&tree);
        let settings = RuleSettings::default();
        let context = RuleContext {
            tree: &tree,
            usage: &usage,
            scopes: &scopes,
            settings: &settings,
        };
        let (set, result) = find_unused_imports(&context).unwrap();
        (set.apply(source).unwrap(), result)
    }

    #[test]
    fn test_partial_named_import() {
        let (out, result) = run("import { a, b } from \"m\"; console.log(a);");
        assert_eq!(out, "import { a } from \"m\"; console.log(a);");
        assert_eq!(result.changes, vec!["b"]);
        assert_eq!(result.summary(), "Removed unused import(s): b");
    }

    #[test]
    fn test_unused_default_deletes_statement() {
        let (out, result) = run("import x from \"m\";\n");
        assert_eq!(out, "\n");
        assert_eq!(result.count, 1);
    }

    #[test]
    fn test_unused_default_with_used_named() {
        let (out, _) = run("import d, { a } from \"m\";\na();\n");
        assert_eq!(out, "import { a } from \"m\";\na();\n");
    }

    #[test]
    fn test_used_default_with_unused_named() {
        let (out, result) = run("import d, { a, b } from \"m\";\nd();\n");
        assert_eq!(out, "import d from \"m\";\nd();\n");
        assert_eq!(result.summary(), "Removed unused import(s): a | b");
    }

    #[test]
    fn test_unused_namespace_with_used_default() {
        let (out, _) = run("import d, * as ns from \"m\";\nd();\n");
        assert_eq!(out, "import d from \"m\";\nd();\n");
    }

    #[test]
    fn test_aliased_specifier_kept_verbatim() {
        let (out, _) = run("import { a as b, c } from \"m\";\nb();\n");
        assert_eq!(out, "import { a as b } from \"m\";\nb();\n");
    }

    #[test]
    fn test_side_effect_import_untouched() {
        let (out, result) = run("import \"./polyfill\";\n");
        assert_eq!(out, "import \"./polyfill\";\n");
        assert_eq!(result.summary(), "No unused imports found!");
        assert!(!result.changed());
    }

    #[test]
    fn test_type_usage_keeps_import() {
        let (out, _) = run("import { Foo, Bar } from \"m\";\nlet v: Foo;\n");
        assert_eq!(out, "import { Foo } from \"m\";\nlet v: Foo;\n");
    }

    #[test]
    fn test_full_range_includes_leading_comment() {
        let (out, _) = run("foo();\n// old helper\nimport x from \"m\";\n");
        assert_eq!(out, "foo();\n");
    }
}
