//! Ruleset loader - YAML file loading and parsing
//!
//! This module handles loading ruleset definitions from YAML (or JSON)
//! files and compiling them.

use super::ruleset::Ruleset;
use super::types::RulesetDefinition;
use crate::kit::error::EngineError;
use std::fs;
use std::path::Path;

/// Loads rulesets from configuration files
pub struct RulesetLoader;

impl RulesetLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load and compile a ruleset from a file
    pub fn load_ruleset<P: AsRef<Path>>(&self, path: P) -> Result<Ruleset, EngineError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EngineError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ruleset::compile(Self::parse_yaml(&content)?)
    }

    /// Parse a ruleset definition from a YAML string
    pub fn parse_yaml(content: &str) -> Result<RulesetDefinition, EngineError> {
        let def: RulesetDefinition = serde_yaml::from_str(content)?;
        Ok(def)
    }
}

impl Default for RulesetLoader {
    fn default() -> Self {
        Self::new()
    }
}
