//! Rule matcher
//!
//! Stateless: every pass scores every rule afresh against the snapshot.

use super::condition::{self, Condition};
use super::ruleset::{Rule, Ruleset};
use crate::kit::snapshot::PullRequestSnapshot;

/// Whether every condition of `rule` holds. An empty list always matches.
pub fn matches(rule: &Rule, snapshot: &PullRequestSnapshot) -> bool {
    rule.conditions
        .iter()
        .all(|c| condition::evaluate(c, snapshot))
}

/// All matching rules, in declaration order
pub fn match_all<'a>(ruleset: &'a Ruleset, snapshot: &PullRequestSnapshot) -> Vec<&'a Rule> {
    ruleset
        .rules()
        .iter()
        .filter(|rule| {
            let matched = matches(rule, snapshot);
            log::debug!(
                "PR #{}: rule '{}' {}",
                snapshot.number,
                rule.name,
                if matched { "matches" } else { "does not match" }
            );
            matched
        })
        .collect()
}

/// Conditions of `rule` that do not currently hold
pub fn missing_conditions<'a>(rule: &'a Rule, snapshot: &PullRequestSnapshot) -> Vec<&'a Condition> {
    rule.conditions
        .iter()
        .filter(|c| !condition::evaluate(c, snapshot))
        .collect()
}
