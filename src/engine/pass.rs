// SPDX-License-Identifier: MIT

//! Evaluation pass
//!
//! One pass = match every rule against one snapshot, run the actions of
//! matching rules, and publish one check-run report per (rule, action).

use serde::Serialize;
use std::sync::Arc;

use crate::engine::report::{self, CheckRunReport};
use crate::engine::rules::{matcher, Ruleset};
use crate::kit::action::ActionContext;
use crate::kit::error::TransportError;
use crate::kit::platform::{Platform, SnapshotProvider};
use crate::kit::snapshot::PullRequestSnapshot;

/// What one pass matched and reported
#[derive(Debug, Clone, Default, Serialize)]
pub struct PassSummary {
    /// Names of matching rules, in declaration order
    pub matched: Vec<String>,
    /// Reports in the order they were produced
    pub reports: Vec<CheckRunReport>,
    /// Names of reports the platform failed to store
    pub publish_failures: Vec<String>,
}

impl PassSummary {
    pub fn report(&self, name: &str) -> Option<&CheckRunReport> {
        self.reports.iter().find(|r| r.name == name)
    }
}

/// Runs evaluation passes for a ruleset.
///
/// Holds no per-pull-request state, so one engine can serve passes for
/// many pull requests concurrently.
#[derive(Clone)]
pub struct Engine {
    ruleset: Arc<Ruleset>,
}

impl Engine {
    pub fn new(ruleset: Ruleset) -> Self {
        Self {
            ruleset: Arc::new(ruleset),
        }
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Failure reports for actions whose configuration cannot run
    pub fn validate(&self) -> Vec<CheckRunReport> {
        self.ruleset
            .rules()
            .iter()
            .flat_map(|rule| {
                rule.actions.iter().filter_map(move |action| {
                    action
                        .validation_error()
                        .map(|outcome| report::report(&rule.name, action.kind(), outcome))
                })
            })
            .collect()
    }

    /// Run one pass over `snapshot`, acting and reporting through `platform`
    pub async fn run_pass(
        &self,
        snapshot: &PullRequestSnapshot,
        platform: &dyn Platform,
    ) -> PassSummary {
        let mut summary = PassSummary::default();
        let ctx = ActionContext { snapshot, platform };

        let matching = matcher::match_all(&self.ruleset, snapshot);
        summary.matched = matching.iter().map(|rule| rule.name.clone()).collect();

        for rule in self.ruleset.rules() {
            let matched = matching.iter().any(|m| std::ptr::eq(*m, rule));
            let missing = if matched {
                Vec::new()
            } else {
                matcher::missing_conditions(rule, snapshot)
            };

            for action in &rule.actions {
                let report = if matched {
                    log::debug!(
                        "PR #{}: running {} for rule '{}'",
                        snapshot.number,
                        action.kind(),
                        rule.name
                    );
                    let outcome = action.run(&ctx).await;
                    if !outcome.is_success() {
                        log::warn!(
                            "PR #{}: rule '{}' ({}) failed: {:?}",
                            snapshot.number,
                            rule.name,
                            action.kind(),
                            outcome
                        );
                    }
                    report::report(&rule.name, action.kind(), outcome)
                } else {
                    report::pending(&rule.name, action.kind(), &missing)
                };

                if let Err(e) = platform.upsert_check_run(&snapshot.head_sha, &report).await {
                    log::error!(
                        "PR #{}: failed to publish '{}': {}",
                        snapshot.number,
                        report.name,
                        e
                    );
                    summary.publish_failures.push(report.name.clone());
                }
                summary.reports.push(report);
            }
        }

        log::info!(
            "PR #{}: pass complete, {} of {} rules matched",
            snapshot.number,
            summary.matched.len(),
            self.ruleset.len()
        );
        summary
    }

    /// Fetch the current snapshot of pull request `number` and run a pass on it
    pub async fn run_for(
        &self,
        number: u64,
        provider: &dyn SnapshotProvider,
        platform: &dyn Platform,
    ) -> Result<PassSummary, TransportError> {
        let snapshot = provider.snapshot(number).await?;
        Ok(self.run_pass(&snapshot, platform).await)
    }
}
