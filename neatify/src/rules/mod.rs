use crate::config::Config;
use crate::cst::SyntaxTree;
use crate::fix::{ConflictError, EditOp, EditSet};
use crate::semantic::{ScopeTree, UsageIndex};
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::Serialize;

pub use ids::{RuleId, UnknownRule};

#[derive(Debug, Clone)]
/// Settings derived from [`Config`] that rules consult.
pub struct RuleSettings {
    /// Names that are never removed or renamed.
    pub ignore_names: FxHashSet<String>,
    /// Compiled ignore pattern.
    pub ignore_pattern: Option<Regex>,
    /// Leave exported declarations alone.
    pub keep_exported: bool,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            ignore_names: FxHashSet::default(),
            ignore_pattern: None,
            keep_exported: true,
        }
    }
}

impl RuleSettings {
    /// Compile settings from configuration.
    ///
    /// # Errors
    /// Returns error if `ignore_pattern` is not a valid regex
    pub fn from_config(config: &Config) -> Result<Self, regex::Error> {
        let section = &config.neatify;
        let ignore_pattern = section
            .ignore_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()?;
        Ok(Self {
            ignore_names: section.ignore_names.iter().cloned().collect(),
            ignore_pattern,
            keep_exported: section.keep_exported(),
        })
    }

    /// Whether `name` is protected by configuration.
    #[must_use]
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore_names.contains(name)
            || self
                .ignore_pattern
                .as_ref()
                .is_some_and(|re| re.is_match(name))
    }
}

#[derive(Debug, Clone, Copy)]
/// Context passed to rules during analysis.
pub struct RuleContext<'a> {
    /// Parsed snapshot.
    pub tree: &'a SyntaxTree,
    /// Name-based usage facts.
    pub usage: &'a UsageIndex,
    /// Scope-resolved bindings.
    pub scopes: &'a ScopeTree,
    /// Configuration settings.
    pub settings: &'a RuleSettings,
}

impl<'a> RuleContext<'a> {
    /// Source text of the snapshot.
    #[must_use]
    pub fn source(&self) -> &'a str {
        &self.tree.source
    }
}

#[derive(Debug, Clone, Default)]
/// What a rule wants to change, before the edits are merged.
pub struct Proposal {
    /// Proposed edits against the snapshot.
    pub edits: Vec<EditOp>,
    /// The rule's signal: names removed, declarations renamed, statements converted.
    pub count: usize,
    /// One line per change, e.g. a removed name or `old -> new`.
    pub changes: Vec<String>,
    /// Changes the rule declined to make, with the reason.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// The user-visible record of what a rule changed.
pub struct RuleResult {
    /// Rule that produced the result.
    pub rule: RuleId,
    /// Number of edits in the merged set.
    pub edits_applied: usize,
    /// The rule's signal count.
    pub count: usize,
    /// Individual changes.
    pub changes: Vec<String>,
    /// Summary message first, then any skipped changes.
    pub summary_lines: Vec<String>,
}

impl RuleResult {
    /// The headline summary message.
    #[must_use]
    pub fn summary(&self) -> &str {
        self.summary_lines.first().map_or("", String::as_str)
    }

    /// Whether the rule changed anything.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.edits_applied > 0
    }
}

/// Trait defining a refactoring rule.
pub trait Rule: Send + Sync {
    /// Returns the unique ID of the rule.
    fn id(&self) -> RuleId;
    /// Returns the descriptive name of the rule.
    fn name(&self) -> &'static str;
    /// Inspect the snapshot and propose edits.
    fn propose(&self, context: &RuleContext<'_>) -> Proposal;
    /// Summary message for a proposal.
    fn headline(&self, proposal: &Proposal) -> String;

    /// Propose, then merge into a conflict-free edit set.
    ///
    /// # Errors
    /// Returns error if the proposed edits overlap without a precedence rule
    fn check(&self, context: &RuleContext<'_>) -> Result<(EditSet, RuleResult), ConflictError> {
        let proposal = self.propose(context);
        let headline = self.headline(&proposal);
        let set = EditSet::merge(proposal.edits)?;
        let mut summary_lines = vec![headline];
        summary_lines.extend(proposal.skipped);
        let result = RuleResult {
            rule: self.id(),
            edits_applied: set.len(),
            count: proposal.count,
            changes: proposal.changes,
            summary_lines,
        };
        Ok((set, result))
    }
}

/// Returns the rule implementing `id`.
#[must_use]
pub fn get_rule(id: RuleId) -> Box<dyn Rule> {
    match id {
        RuleId::UnusedImports => Box::new(imports::UnusedImportRule),
        RuleId::UnusedVariables => Box::new(variables::UnusedVariableRule),
        RuleId::Casing => Box::new(casing::CasingRule),
        RuleId::Bindings => Box::new(bindings::VarToLetRule),
    }
}

/// Module containing the mutable-binding modernizer.
pub mod bindings;
/// Module containing the identifier-casing normalizer.
pub mod casing;
/// Module containing rule ID constants.
pub mod ids;
/// Module containing the unused-import eliminator.
pub mod imports;
/// Module containing the unused-variable eliminator.
pub mod variables;

pub use bindings::find_var_declarations;
pub use casing::{find_non_camel_case_names, is_camel_case, to_camel_case};
pub use imports::find_unused_imports;
pub use variables::find_unused_variables;
