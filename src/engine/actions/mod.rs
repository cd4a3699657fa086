// SPDX-License-Identifier: MIT

//! Actions a rule can run
//!
//! Each action kind has a typed configuration and an implementation of
//! [`Action`]. [`ActionConfig`] is the tagged union tying a ruleset entry
//! (`review: {type: APPROVE}`) to its implementation.

pub mod comment;
pub mod label;
pub mod review;

use std::sync::Arc;

use crate::kit::action::Action;
use crate::kit::error::EngineError;

pub use comment::{CommentAction, CommentConfig};
pub use label::{LabelAction, LabelConfig};
pub use review::{ReviewAction, ReviewConfig};

/// Action kinds accepted in rulesets
pub const KINDS: &[&str] = &["review", "comment", "label"];

#[derive(Debug, Clone, PartialEq)]
pub enum ActionConfig {
    Review(ReviewConfig),
    Comment(CommentConfig),
    Label(LabelConfig),
}

impl ActionConfig {
    /// Decode the configuration found under `kind` in a rule's `actions`
    pub fn from_entry(kind: &str, value: serde_yaml::Value) -> Result<Self, EngineError> {
        // `review:` with no body means "all defaults"
        let value = match value {
            serde_yaml::Value::Null => serde_yaml::Value::Mapping(Default::default()),
            other => other,
        };
        let config = match kind {
            "review" => Self::Review(serde_yaml::from_value(value)?),
            "comment" => Self::Comment(serde_yaml::from_value(value)?),
            "label" => Self::Label(serde_yaml::from_value(value)?),
            other => {
                return Err(EngineError::config(format!(
                    "unknown action '{}', expected one of: {}",
                    other,
                    KINDS.join(", ")
                )))
            }
        };
        Ok(config)
    }

    pub fn build(self) -> Arc<dyn Action> {
        match self {
            Self::Review(config) => Arc::new(ReviewAction::new(config)),
            Self::Comment(config) => Arc::new(CommentAction::new(config)),
            Self::Label(config) => Arc::new(LabelAction::new(config)),
        }
    }
}
