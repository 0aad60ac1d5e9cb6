//! Centralized Rule IDs for Neatify.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Imports: remove import bindings that are never referenced
pub const RULE_ID_UNUSED_IMPORTS: &str = "remove-unused-imports";
/// Variables: remove variable declarations that are never referenced
pub const RULE_ID_UNUSED_VARIABLES: &str = "remove-unused-variables";
/// Naming: rename variables and functions to camelCase
pub const RULE_ID_CASING: &str = "normalize-casing";
/// Modernization: replace `var` with `let`
pub const RULE_ID_BINDINGS: &str = "modernize-bindings";

/// One of the four refactoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleId {
    /// `remove-unused-imports`
    #[serde(rename = "remove-unused-imports")]
    UnusedImports,
    /// `remove-unused-variables`
    #[serde(rename = "remove-unused-variables")]
    UnusedVariables,
    /// `normalize-casing`
    #[serde(rename = "normalize-casing")]
    Casing,
    /// `modernize-bindings`
    #[serde(rename = "modernize-bindings")]
    Bindings,
}

impl RuleId {
    /// Every rule in pipeline order: cleanup first, then renaming and modernization.
    pub const ALL: [RuleId; 4] = [
        RuleId::UnusedImports,
        RuleId::UnusedVariables,
        RuleId::Casing,
        RuleId::Bindings,
    ];

    /// Stable textual id.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnusedImports => RULE_ID_UNUSED_IMPORTS,
            Self::UnusedVariables => RULE_ID_UNUSED_VARIABLES,
            Self::Casing => RULE_ID_CASING,
            Self::Bindings => RULE_ID_BINDINGS,
        }
    }

    /// One-line description for listings.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnusedImports => "Remove import bindings that are never referenced",
            Self::UnusedVariables => "Remove variable declarations that are never referenced",
            Self::Casing => "Rename variables and functions to camelCase",
            Self::Bindings => "Replace 'var' declarations with 'let'",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised for a rule id that names no rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rule '{0}' (expected one of: remove-unused-imports, remove-unused-variables, normalize-casing, modernize-bindings)")]
pub struct UnknownRule(pub String);

impl FromStr for RuleId {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownRule(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_ids() {
        for id in RuleId::ALL {
            assert_eq!(id.as_str().parse::<RuleId>().unwrap(), id);
        }
    }

    #[test]
    fn test_unknown_rule() {
        let err = "remove-everything".parse::<RuleId>().unwrap_err();
        assert!(err.to_string().contains("remove-everything"));
    }

    #[test]
    fn test_pipeline_order() {
        assert_eq!(RuleId::ALL[0], RuleId::UnusedImports);
        assert_eq!(RuleId::ALL[3], RuleId::Bindings);
        assert_eq!(
            serde_json::to_string(&RuleId::Casing).unwrap(),
            "\"normalize-casing\""
        );
    }
}
