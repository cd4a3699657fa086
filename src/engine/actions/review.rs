// SPDX-License-Identifier: MIT

//! `review` action: submit an approval, change request or comment review

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::engine::template::{Template, TemplateContext};
use crate::kit::action::{Action, ActionContext, ActionOutcome};
use crate::kit::error::TemplateError;
use crate::kit::snapshot::{PullRequestSnapshot, ReviewType};

pub const INVALID_MESSAGE_TITLE: &str = "Invalid review message";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReviewConfig {
    #[serde(rename = "type", default)]
    pub review_type: ReviewType,
    #[serde(default)]
    pub message: Option<String>,
}

pub struct ReviewAction {
    review_type: ReviewType,
    /// Validated at construction; an invalid template is kept as the error
    message: Result<Option<Template>, TemplateError>,
}

impl ReviewAction {
    pub fn new(config: ReviewConfig) -> Self {
        let message = config.message.as_deref().map(Template::validate).transpose();
        if let Err(e) = &message {
            log::warn!("review action has an invalid message: {}", e);
        }
        Self {
            review_type: config.review_type,
            message,
        }
    }

    fn invalid(err: &TemplateError) -> ActionOutcome {
        ActionOutcome::validation_error(INVALID_MESSAGE_TITLE, err.to_string())
    }
}

/// Whether `identity` already has an equivalent review on the pull request.
///
/// Only its most recent review counts: it must be in the state `review_type`
/// produces and carry the same body. An absent body and an empty body are
/// the same. An older matching review superseded by a later one does not.
pub fn has_equivalent_review(
    snapshot: &PullRequestSnapshot,
    identity: &str,
    review_type: ReviewType,
    body: Option<&str>,
) -> bool {
    snapshot.latest_review_by(identity).is_some_and(|review| {
        review.state == review_type.resulting_state()
            && review.body.as_deref().unwrap_or("") == body.unwrap_or("")
    })
}

#[async_trait]
impl Action for ReviewAction {
    fn kind(&self) -> &str {
        "review"
    }

    fn validation_error(&self) -> Option<ActionOutcome> {
        self.message.as_ref().err().map(Self::invalid)
    }

    async fn run(&self, ctx: &ActionContext<'_>) -> ActionOutcome {
        let template = match &self.message {
            Ok(template) => template,
            Err(e) => return Self::invalid(e),
        };
        let body = match template {
            Some(t) => match t.render(&TemplateContext::from_snapshot(ctx.snapshot)) {
                Ok(body) => Some(body),
                Err(e) => return Self::invalid(&e),
            },
            None => None,
        };

        let identity = ctx.platform.identity();
        if has_equivalent_review(ctx.snapshot, identity, self.review_type, body.as_deref()) {
            log::debug!(
                "PR #{}: {} review by {} already present, skipping",
                ctx.snapshot.number,
                self.review_type,
                identity
            );
            return ActionOutcome::success(
                "Review posted",
                format!("{} review was already submitted", self.review_type),
            );
        }

        match ctx
            .platform
            .submit_review(ctx.snapshot.number, self.review_type, body.as_deref())
            .await
        {
            Ok(ack) => {
                log::info!(
                    "PR #{}: submitted {} review (id {})",
                    ctx.snapshot.number,
                    self.review_type,
                    ack.id
                );
                ActionOutcome::success(
                    "Review posted",
                    format!("{} review submitted", self.review_type),
                )
            }
            Err(e) => {
                log::error!("PR #{}: review submission failed: {}", ctx.snapshot.number, e);
                ActionOutcome::runtime_error("Review failed", e.to_string())
            }
        }
    }
}
