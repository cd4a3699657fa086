// SPDX-License-Identifier: MIT

//! `comment` action: post a templated comment once

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::engine::template::{Template, TemplateContext};
use crate::kit::action::{Action, ActionContext, ActionOutcome};
use crate::kit::error::TemplateError;

pub const INVALID_MESSAGE_TITLE: &str = "Invalid comment message";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentConfig {
    pub message: String,
}

pub struct CommentAction {
    message: Result<Template, TemplateError>,
}

impl CommentAction {
    pub fn new(config: CommentConfig) -> Self {
        let message = Template::validate(&config.message);
        if let Err(e) = &message {
            log::warn!("comment action has an invalid message: {}", e);
        }
        Self { message }
    }

    fn invalid(err: &TemplateError) -> ActionOutcome {
        ActionOutcome::validation_error(INVALID_MESSAGE_TITLE, err.to_string())
    }
}

#[async_trait]
impl Action for CommentAction {
    fn kind(&self) -> &str {
        "comment"
    }

    fn validation_error(&self) -> Option<ActionOutcome> {
        self.message.as_ref().err().map(Self::invalid)
    }

    async fn run(&self, ctx: &ActionContext<'_>) -> ActionOutcome {
        let template = match &self.message {
            Ok(t) => t,
            Err(e) => return Self::invalid(e),
        };
        let body = match template.render(&TemplateContext::from_snapshot(ctx.snapshot)) {
            Ok(body) => body,
            Err(e) => return Self::invalid(&e),
        };

        let identity = ctx.platform.identity();
        let already_posted = ctx
            .snapshot
            .latest_comment_by(identity)
            .is_some_and(|c| c.body == body);
        if already_posted {
            log::debug!(
                "PR #{}: comment already posted, skipping",
                ctx.snapshot.number
            );
            return ActionOutcome::success("Comment posted", "The comment was already posted");
        }

        match ctx.platform.post_comment(ctx.snapshot.number, &body).await {
            Ok(ack) => {
                log::info!(
                    "PR #{}: posted comment (id {})",
                    ctx.snapshot.number,
                    ack.id
                );
                ActionOutcome::success("Comment posted", body)
            }
            Err(e) => {
                log::error!("PR #{}: posting comment failed: {}", ctx.snapshot.number, e);
                ActionOutcome::runtime_error("Unable to post comment", e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::platforms::memory::MemoryPlatform;
    use crate::kit::snapshot::PullRequestSnapshot;

    #[tokio::test]
    async fn test_comment_posted_once() {
        let pr = PullRequestSnapshot {
            number: 3,
            author: "bob".to_string(),
            ..Default::default()
        };
        let platform = MemoryPlatform::new("prflow-bot", pr);
        let action = CommentAction::new(CommentConfig {
            message: "Thanks {{ author }}!".to_string(),
        });

        for _ in 0..2 {
            let current = platform.snapshot_now();
            let ctx = ActionContext {
                snapshot: &current,
                platform: &platform,
            };
            assert!(action.run(&ctx).await.is_success());
        }

        let comments = platform.snapshot_now().comments;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].body, "Thanks bob!");
        assert_eq!(comments[0].author, "prflow-bot");
    }

    #[test]
    fn test_invalid_comment_message() {
        let action = CommentAction::new(CommentConfig {
            message: "Hi {{ reviewer }}".to_string(),
        });
        assert_eq!(
            action.validation_error(),
            Some(ActionOutcome::validation_error(
                "Invalid comment message",
                "There is an error in your message, the following variable is unknown: reviewer"
            ))
        );
    }
}
