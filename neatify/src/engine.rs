//! Orchestrator: runs rules against a text snapshot and applies their edits.

use crate::config::Config;
use crate::cst::{parse, SyntaxTree};
use crate::error::{NeatifyError, Result};
use crate::rules::{get_rule, RuleContext, RuleId, RuleResult, RuleSettings};
use crate::semantic::{summarize_declarations, DeclarationSummary, ScopeTree, UsageIndex};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Outcome of a single rule run or a whole pipeline run.
pub struct RunReport {
    /// Text after every successful stage was applied.
    pub updated_text: String,
    /// One result per stage, in the order the stages ran.
    pub results: Vec<RuleResult>,
}

impl RunReport {
    /// Whether any stage edited the text.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.results.iter().any(RuleResult::changed)
    }

    /// Headline summaries, one per stage.
    #[must_use]
    pub fn summaries(&self) -> Vec<&str> {
        self.results.iter().map(RuleResult::summary).collect()
    }

    /// Total edits applied across stages.
    #[must_use]
    pub fn edits_applied(&self) -> usize {
        self.results.iter().map(|r| r.edits_applied).sum()
    }
}

/// Runs rules over single-file snapshots.
///
/// The engine holds no per-file state; one instance can serve many files
/// concurrently.
#[derive(Debug, Clone)]
pub struct Engine {
    settings: RuleSettings,
    pipeline: Vec<RuleId>,
    verify: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            settings: RuleSettings::default(),
            pipeline: RuleId::ALL.to_vec(),
            verify: true,
        }
    }
}

impl Engine {
    /// Build an engine from configuration.
    ///
    /// # Errors
    /// Returns error if `ignore_pattern` does not compile or `rules` names an
    /// unknown rule
    pub fn new(config: &Config) -> Result<Self> {
        let settings = RuleSettings::from_config(config)?;
        let pipeline = match &config.neatify.rules {
            Some(ids) => ids
                .iter()
                .map(|id| id.parse::<RuleId>())
                .collect::<std::result::Result<Vec<_>, _>>()?,
            None => RuleId::ALL.to_vec(),
        };
        Ok(Self {
            settings,
            pipeline,
            verify: config.neatify.verify(),
        })
    }

    /// Rules run by [`Engine::run_all`], in order.
    #[must_use]
    pub fn pipeline(&self) -> &[RuleId] {
        &self.pipeline
    }

    /// Settings handed to every rule.
    #[must_use]
    pub fn settings(&self) -> &RuleSettings {
        &self.settings
    }

    /// Run one rule against `text`.
    ///
    /// The run is atomic: on error no edits are applied and the caller keeps
    /// `text`.
    ///
    /// # Errors
    /// Returns error if the edits conflict, do not fit the text, or (with
    /// `verify` on) the output parses with more errors than the input
    #[tracing::instrument(level = "debug", skip(self, text), fields(len = text.len()))]
    pub fn run_rule(&self, rule: RuleId, text: &str, file_identity: &str) -> Result<RunReport> {
        let tree = parse(text, file_identity)?;
        let (updated_text, result) = self.apply_rule(rule, &tree, file_identity)?;
        Ok(RunReport {
            updated_text,
            results: vec![result],
        })
    }

    /// Run the configured pipeline, re-parsing between stages.
    ///
    /// # Errors
    /// Returns [`NeatifyError::StageFailed`] for the first failing stage;
    /// later stages do not run
    #[tracing::instrument(level = "debug", skip(self, text), fields(len = text.len()))]
    pub fn run_all(&self, text: &str, file_identity: &str) -> Result<RunReport> {
        let mut current = text.to_owned();
        let mut results = Vec::with_capacity(self.pipeline.len());
        for (index, &stage) in self.pipeline.iter().enumerate() {
            let step = parse(&current, file_identity)
                .map_err(NeatifyError::from)
                .and_then(|tree| self.apply_rule(stage, &tree, file_identity));
            match step {
                Ok((updated, result)) => {
                    current = updated;
                    results.push(result);
                }
                Err(source) => {
                    tracing::debug!(%stage, index, error = %source, "pipeline stage failed");
                    return Err(NeatifyError::StageFailed {
                        stage,
                        index,
                        source: Box::new(source),
                    });
                }
            }
        }
        Ok(RunReport {
            updated_text: current,
            results,
        })
    }

    /// List the variable and function names declared in `text`.
    ///
    /// # Errors
    /// Returns error if no tree could be produced
    pub fn summarize_declarations(
        &self,
        text: &str,
        file_identity: &str,
    ) -> Result<DeclarationSummary> {
        let tree = parse(text, file_identity)?;
        Ok(summarize_declarations(&tree))
    }

    fn apply_rule(
        &self,
        rule: RuleId,
        tree: &SyntaxTree,
        file_identity: &str,
    ) -> Result<(String, RuleResult)> {
        let usage = UsageIndex::build(tree);
        let scopes = ScopeTree::build(tree);
        let context = RuleContext {
            tree,
            usage: &usage,
            scopes: &scopes,
            settings: &self.settings,
        };

        let (set, result) = get_rule(rule)
            .check(&context)
            .map_err(|source| NeatifyError::Conflict { rule, source })?;
        if set.is_empty() {
            return Ok((tree.source.clone(), result));
        }
        let updated = set
            .apply(&tree.source)
            .map_err(|source| NeatifyError::Rewrite { rule, source })?;

        if self.verify {
            let before = tree.error_count();
            let after = parse(&updated, file_identity)?.error_count();
            if after > before {
                return Err(NeatifyError::SyntaxRegression {
                    rule,
                    before,
                    after,
                });
            }
        }
        tracing::debug!(
            %rule,
            edits = set.len(),
            superseded = set.superseded(),
            "rule applied"
        );
        Ok((updated, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_run_rule_reports_summary() {
        let engine = Engine::default();
        let report = engine
            .run_rule(
                RuleId::UnusedImports,
                "import { a, b } from \"m\"; console.log(a);",
                "app.js",
            )
            .unwrap();
        assert_eq!(report.updated_text, "import { a } from \"m\"; console.log(a);");
        assert_eq!(report.summaries(), vec!["Removed unused import(s): b"]);
        assert!(report.changed());
    }

    #[test]
    fn test_run_all_order_and_reparse() {
        let engine = Engine::default();
        let source = "import { used, dead } from \"m\";\nvar my_total = used();\nvar scratch = 1;\nconsole.log(my_total);\n";
        let report = engine.run_all(source, "app.js").unwrap();
        assert_eq!(
            report.updated_text,
            "import { used } from \"m\";\nlet myTotal = used();\nconsole.log(myTotal);\n"
        );
        let rules: Vec<RuleId> = report.results.iter().map(|r| r.rule).collect();
        assert_eq!(rules, RuleId::ALL.to_vec());
    }

    #[test]
    fn test_unchanged_text_is_returned_verbatim() {
        let engine = Engine::default();
        let source = "const total = 1;\nexport default total;\n";
        let report = engine.run_all(source, "a.js").unwrap();
        assert_eq!(report.updated_text, source);
        assert!(!report.changed());
        assert_eq!(report.edits_applied(), 0);
    }

    #[test]
    fn test_configured_pipeline() {
        let config = Config::from_toml("[neatify]\nrules = [\"modernize-bindings\"]\n").unwrap();
        let engine = Engine::new(&config).unwrap();
        assert_eq!(engine.pipeline(), &[RuleId::Bindings]);
        let report = engine.run_all("var unused = 1;\n", "a.js").unwrap();
        assert_eq!(report.updated_text, "let unused = 1;\n");
        assert_eq!(report.results.len(), 1);
    }

    #[test]
    fn test_unknown_rule_in_config() {
        let config = Config::from_toml("[neatify]\nrules = [\"tidy\"]\n").unwrap();
        let err = Engine::new(&config).unwrap_err();
        assert!(matches!(err, NeatifyError::UnknownRule(_)));
    }

    #[test]
    fn test_invalid_pattern_in_config() {
        let config = Config::from_toml("[neatify]\nignore_pattern = \"(\"\n").unwrap();
        let err = Engine::new(&config).unwrap_err();
        assert!(matches!(err, NeatifyError::InvalidPattern(_)));
    }

    #[test]
    fn test_summarize_declarations() {
        let engine = Engine::default();
        let summary = engine
            .summarize_declarations("let a = 1; function f() {}", "a.js")
            .unwrap();
        assert_eq!(summary.to_string(), "Variables: a | Functions: f");
    }

    #[test]
    fn test_partial_input_still_runs() {
        let engine = Engine::default();
        let source = "import { a } from \"m\";\na(;\n";
        let report = engine.run_rule(RuleId::UnusedImports, source, "a.js").unwrap();
        assert_eq!(report.updated_text, source);
    }
}
