// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::kit::platform::Platform;
use crate::kit::snapshot::PullRequestSnapshot;

/// Result of running one action for one rule
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The desired state holds; `summary` describes the side effect (if any)
    Success { title: String, summary: String },
    /// The action's configuration is unusable; nothing was done
    ValidationError { title: String, summary: String },
    /// The platform refused or failed the side effect
    RuntimeError { title: String, summary: String },
}

impl ActionOutcome {
    pub fn success(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self::Success {
            title: title.into(),
            summary: summary.into(),
        }
    }

    pub fn validation_error(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self::ValidationError {
            title: title.into(),
            summary: summary.into(),
        }
    }

    pub fn runtime_error(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self::RuntimeError {
            title: title.into(),
            summary: summary.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Everything an action may read or call during one evaluation pass
pub struct ActionContext<'a> {
    pub snapshot: &'a PullRequestSnapshot,
    pub platform: &'a dyn Platform,
}

/// Trait for actions a rule can trigger.
///
/// Implementations are built once per ruleset and must be idempotent:
/// running against a pull request that already reflects the action is a
/// no-op that still returns `Success`.
#[async_trait]
pub trait Action: Send + Sync {
    /// Action kind as written in the ruleset (e.g. `review`)
    fn kind(&self) -> &str;

    /// Outcome to report instead of running, when the configuration
    /// failed validation
    fn validation_error(&self) -> Option<ActionOutcome> {
        None
    }

    /// Run the action against the current pull request state
    async fn run(&self, ctx: &ActionContext<'_>) -> ActionOutcome;
}
