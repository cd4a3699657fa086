// SPDX-License-Identifier: MIT

//! YAML schema types for rulesets
//!
//! These mirror the configuration file as written; [`super::Ruleset`] is
//! the compiled form used during evaluation.

use serde::{Deserialize, Serialize};

/// Top-level ruleset file
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RulesetDefinition {
    #[serde(default)]
    pub pull_request_rules: Vec<RuleDefinition>,
}

/// One rule as written in the ruleset
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RuleDefinition {
    /// Unique name, used in check-run names
    pub name: String,
    /// Condition strings, all of which must hold
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Action kind to configuration, in declaration order
    pub actions: serde_yaml::Mapping,
}
