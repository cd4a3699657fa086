// SPDX-License-Identifier: MIT

//! `label` action: add and remove labels

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::kit::action::{Action, ActionContext, ActionOutcome};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LabelConfig {
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

pub struct LabelAction {
    config: LabelConfig,
}

impl LabelAction {
    pub fn new(config: LabelConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Action for LabelAction {
    fn kind(&self) -> &str {
        "label"
    }

    fn validation_error(&self) -> Option<ActionOutcome> {
        self.config
            .add
            .iter()
            .find(|l| self.config.remove.contains(l))
            .map(|l| {
                ActionOutcome::validation_error(
                    "Invalid label configuration",
                    format!("Label '{}' is both added and removed", l),
                )
            })
    }

    async fn run(&self, ctx: &ActionContext<'_>) -> ActionOutcome {
        if let Some(invalid) = self.validation_error() {
            return invalid;
        }

        let current = &ctx.snapshot.labels;
        let to_add: Vec<String> = self
            .config
            .add
            .iter()
            .filter(|l| !current.contains(l))
            .cloned()
            .collect();
        let to_remove: Vec<&String> = self
            .config
            .remove
            .iter()
            .filter(|l| current.contains(l))
            .collect();

        if to_add.is_empty() && to_remove.is_empty() {
            return ActionOutcome::success("Labels already set", "");
        }

        let number = ctx.snapshot.number;
        if !to_add.is_empty() {
            if let Err(e) = ctx.platform.add_labels(number, &to_add).await {
                log::error!("PR #{}: adding labels failed: {}", number, e);
                return ActionOutcome::runtime_error("Unable to add labels", e.to_string());
            }
        }
        for label in &to_remove {
            if let Err(e) = ctx.platform.remove_label(number, label).await {
                log::error!("PR #{}: removing label '{}' failed: {}", number, label, e);
                return ActionOutcome::runtime_error("Unable to remove label", e.to_string());
            }
        }

        log::info!(
            "PR #{}: labels added {:?}, removed {:?}",
            number,
            to_add,
            to_remove
        );
        ActionOutcome::success("Labels added/removed", "")
    }
}
