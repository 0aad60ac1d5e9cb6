//! Identifier-casing normalizer.

use crate::constants::{get_camel_case_re, get_reserved_words, get_word_boundary_re};
use crate::cst::TextRange;
use crate::fix::{ConflictError, EditOp, EditSet};
use crate::rules::{Proposal, Rule, RuleContext, RuleId, RuleResult};
use crate::semantic::{Binding, BindingKind, OccurrenceForm};
use regex::Captures;
use rustc_hash::FxHashSet;

/// Renames variables and functions to camelCase, by binding.
pub struct CasingRule;

impl Rule for CasingRule {
    fn id(&self) -> RuleId {
        RuleId::Casing
    }

    fn name(&self) -> &'static str {
        "CasingRule"
    }

    fn propose(&self, context: &RuleContext<'_>) -> Proposal {
        let mut proposal = Proposal::default();
        let mut taken: FxHashSet<String> = FxHashSet::default();

        for binding in context.scopes.bindings() {
            if !(binding.kind.is_variable() || binding.kind == BindingKind::Function) {
                continue;
            }
            let old = binding.name.as_str();
            if is_camel_case(old) || context.settings.is_ignored(old) {
                continue;
            }
            match plan_rename(binding, context, &taken) {
                Ok(new) => {
                    push_rename_edits(binding, &new, context, &mut proposal.edits);
                    proposal.count += 1;
                    proposal.changes.push(format!("{old} -> {new}"));
                    taken.insert(new);
                }
                Err(reason) => {
                    tracing::debug!(name = old, reason, "rename skipped");
                    proposal.skipped.push(format!("Skipped '{old}': {reason}"));
                }
            }
        }
        proposal
    }

    fn headline(&self, proposal: &Proposal) -> String {
        if proposal.count == 0 {
            "All names are already camelCase!".to_owned()
        } else {
            format!(
                "Renamed {} variable/function(s) to camelCase.",
                proposal.count
            )
        }
    }
}

/// Find non-camelCase declarations and merge their renames into an edit set.
///
/// # Errors
/// Returns error if the proposed edits conflict
pub fn find_non_camel_case_names(
    context: &RuleContext<'_>,
) -> Result<(EditSet, RuleResult), ConflictError> {
    CasingRule.check(context)
}

/// Whether `name` starts with a lowercase letter followed only by letters and digits.
#[must_use]
pub fn is_camel_case(name: &str) -> bool {
    get_camel_case_re().is_match(name)
}

/// Fold `-x`/`_x` into `X`, then lowercase a leading uppercase letter.
#[must_use]
pub fn to_camel_case(name: &str) -> String {
    let folded =
        get_word_boundary_re().replace_all(name, |caps: &Captures<'_>| caps[1].to_uppercase());
    let mut chars = folded.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => first.to_lowercase().chain(chars).collect(),
        _ => folded.into_owned(),
    }
}

fn plan_rename(
    binding: &Binding,
    context: &RuleContext<'_>,
    taken: &FxHashSet<String>,
) -> Result<String, &'static str> {
    if binding.exported && context.settings.keep_exported {
        return Err("exported name");
    }
    let mut references = context.scopes.references_to(binding.id);
    if references.any(|r| r.form == OccurrenceForm::JsxTag) {
        return Err("used as a JSX component");
    }
    let new = to_camel_case(&binding.name);
    if !is_camel_case(&new) {
        return Err("no camelCase form");
    }
    if get_reserved_words().contains(new.as_str()) {
        return Err("target is a reserved word");
    }
    if context.usage.contains_name(&new) || taken.contains(&new) {
        return Err("target name already in use");
    }
    Ok(new)
}

fn push_rename_edits(
    binding: &Binding,
    new: &str,
    context: &RuleContext<'_>,
    edits: &mut Vec<EditOp>,
) {
    let old = binding.name.as_str();
    let sites = binding
        .declarations
        .iter()
        .map(|d| (d.range, d.form))
        .chain(context.scopes.references_to(binding.id).map(|r| (r.range, r.form)));
    for (range, form) in sites {
        edits.push(rename_edit(range, form, old, new));
    }
}

fn rename_edit(range: TextRange, form: OccurrenceForm, old: &str, new: &str) -> EditOp {
    let text = match form {
        OccurrenceForm::ObjectShorthand | OccurrenceForm::PatternShorthand => {
            format!("{old}: {new}")
        }
        OccurrenceForm::ExportSpecifier => format!("{new} as {old}"),
        OccurrenceForm::Plain | OccurrenceForm::JsxTag => new.to_owned(),
    };
    EditOp::Replace { range, text }
}
