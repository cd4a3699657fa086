// SPDX-License-Identifier: MIT

//! Compiled rules

use std::collections::HashSet;
use std::sync::Arc;

use super::condition::{self, Condition};
use super::types::{RuleDefinition, RulesetDefinition};
use crate::engine::actions::ActionConfig;
use crate::kit::action::Action;
use crate::kit::error::EngineError;
use crate::kit::snapshot::ATTRIBUTES;

/// A rule ready for evaluation
pub struct Rule {
    pub name: String,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Arc<dyn Action>>,
}

impl Rule {
    pub fn compile(def: RuleDefinition) -> Result<Self, EngineError> {
        let mut conditions = Vec::with_capacity(def.conditions.len());
        for text in &def.conditions {
            let parsed = condition::parse(text)
                .map_err(|e| EngineError::rule(&def.name, e.to_string()))?;
            if !ATTRIBUTES.contains(&parsed.attribute.as_str()) {
                log::warn!(
                    "rule '{}': unknown attribute '{}', condition will never match",
                    def.name,
                    parsed.attribute
                );
            }
            conditions.push(parsed);
        }

        if def.actions.is_empty() {
            return Err(EngineError::rule(&def.name, "no actions configured"));
        }
        let mut actions = Vec::with_capacity(def.actions.len());
        for (key, value) in def.actions {
            let kind = key
                .as_str()
                .ok_or_else(|| EngineError::rule(&def.name, "action names must be strings"))?
                .to_string();
            let config = ActionConfig::from_entry(&kind, value)
                .map_err(|e| EngineError::rule(&def.name, e.to_string()))?;
            actions.push(config.build());
        }

        Ok(Self {
            name: def.name,
            conditions,
            actions,
        })
    }

    pub fn action_kinds(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|a| a.kind())
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("conditions", &self.conditions)
            .field("actions", &self.action_kinds().collect::<Vec<_>>())
            .finish()
    }
}

/// An ordered, immutable list of rules
#[derive(Debug, Default)]
pub struct Ruleset {
    rules: Vec<Rule>,
}

impl Ruleset {
    /// Compile every rule, rejecting duplicate names
    pub fn compile(def: RulesetDefinition) -> Result<Self, EngineError> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(def.pull_request_rules.len());
        for rule_def in def.pull_request_rules {
            if !seen.insert(rule_def.name.clone()) {
                return Err(EngineError::rule(&rule_def.name, "duplicate rule name"));
            }
            rules.push(Rule::compile(rule_def)?);
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
