// SPDX-License-Identifier: MIT

//! Check-run reporting
//!
//! One report per (rule, action) pair. Reports are keyed by name so the
//! platform can upsert them: a later pass replaces an earlier report.

use serde::{Deserialize, Serialize};

use crate::engine::rules::condition::Condition;
use crate::kit::action::ActionOutcome;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Conclusion {
    Success,
    Failure,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckRunReport {
    pub name: String,
    pub title: String,
    pub summary: String,
    pub conclusion: Conclusion,
}

/// Name under which a (rule, action) pair is reported
pub fn check_run_name(rule_name: &str, action_kind: &str) -> String {
    format!("Rule: {} ({})", rule_name, action_kind)
}

/// Report for an action that ran (or was refused by validation)
pub fn report(rule_name: &str, action_kind: &str, outcome: ActionOutcome) -> CheckRunReport {
    let (conclusion, title, summary) = match outcome {
        ActionOutcome::Success { title, summary } => (Conclusion::Success, title, summary),
        ActionOutcome::ValidationError { title, summary }
        | ActionOutcome::RuntimeError { title, summary } => (Conclusion::Failure, title, summary),
    };
    CheckRunReport {
        name: check_run_name(rule_name, action_kind),
        title,
        summary,
        conclusion,
    }
}

/// Report for an action whose rule does not currently match
pub fn pending(rule_name: &str, action_kind: &str, missing: &[&Condition]) -> CheckRunReport {
    let summary = missing
        .iter()
        .map(|c| format!("- [ ] `{}`", c))
        .collect::<Vec<_>>()
        .join("\n");
    CheckRunReport {
        name: check_run_name(rule_name, action_kind),
        title: "Waiting for conditions to match".to_string(),
        summary,
        conclusion: Conclusion::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rules::condition::parse;

    #[test]
    fn test_report_name() {
        assert_eq!(check_run_name("review", "review"), "Rule: review (review)");
    }

    #[test]
    fn test_success_report() {
        let report = report(
            "approve",
            "review",
            ActionOutcome::success("Review posted", "APPROVE review submitted"),
        );
        assert_eq!(report.name, "Rule: approve (review)");
        assert_eq!(report.conclusion, Conclusion::Success);
        assert_eq!(report.title, "Review posted");
    }

    #[test]
    fn test_failures_carry_outcome_text() {
        let validation = report(
            "review",
            "review",
            ActionOutcome::validation_error("Invalid review message", "bad"),
        );
        assert_eq!(validation.conclusion, Conclusion::Failure);
        assert_eq!(validation.title, "Invalid review message");
        assert_eq!(validation.summary, "bad");

        let runtime = report(
            "review",
            "review",
            ActionOutcome::runtime_error("Review failed", "timeout"),
        );
        assert_eq!(runtime.conclusion, Conclusion::Failure);
        assert_eq!(runtime.summary, "timeout");
    }

    #[test]
    fn test_pending_lists_missing_conditions() {
        let cond = parse("#approved-reviews-by>=1").unwrap();
        let report = pending("requested", "review", &[&cond]);
        assert_eq!(report.conclusion, Conclusion::Pending);
        assert_eq!(report.summary, "- [ ] `#approved-reviews-by>=1`");
    }

    #[test]
    fn test_conclusion_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Conclusion::Failure).unwrap(),
            "\"failure\""
        );
    }
}
