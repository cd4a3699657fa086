// SPDX-License-Identifier: MIT

//! Pull request snapshot
//!
//! An immutable view of one pull request, taken once per evaluation pass.
//! Conditions read it through [`PullRequestSnapshot::attribute`], which maps
//! the attribute names used in rulesets to typed values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of a submitted review, as the platform reports it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

/// Kind of review the automation can submit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewType {
    #[default]
    Approve,
    RequestChanges,
    Comment,
}

impl ReviewType {
    /// The review state a submission of this type produces
    pub fn resulting_state(&self) -> ReviewState {
        match self {
            ReviewType::Approve => ReviewState::Approved,
            ReviewType::RequestChanges => ReviewState::ChangesRequested,
            ReviewType::Comment => ReviewState::Commented,
        }
    }

    /// Event name expected by the review API
    pub fn as_event(&self) -> &'static str {
        match self {
            ReviewType::Approve => "APPROVE",
            ReviewType::RequestChanges => "REQUEST_CHANGES",
            ReviewType::Comment => "COMMENT",
        }
    }
}

impl std::fmt::Display for ReviewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_event())
    }
}

/// One entry of the review history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub reviewer: String,
    pub state: ReviewState,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// One entry of the issue comment history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub author: String,
    pub body: String,
}

/// Read-only view of a pull request for one evaluation pass
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PullRequestSnapshot {
    pub number: u64,
    pub base: String,
    pub head: String,
    pub head_sha: String,
    pub author: String,
    pub title: String,
    pub body: Option<String>,
    pub labels: Vec<String>,
    pub draft: bool,
    pub merged: bool,
    pub closed: bool,
    pub locked: bool,
    pub mergeable_state: Option<String>,
    pub files: Vec<String>,
    pub assignees: Vec<String>,
    pub requested_reviewers: Vec<String>,
    /// Review history, oldest first
    pub reviews: Vec<Review>,
    /// Comment history, oldest first
    pub comments: Vec<Comment>,
}

/// Typed value of a queryable attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<String>),
}

impl Attribute {
    /// Size used by `#attr` conditions
    pub fn cardinality(&self) -> f64 {
        match self {
            Attribute::Text(s) => s.chars().count() as f64,
            Attribute::Number(n) => *n,
            Attribute::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Attribute::List(items) => items.len() as f64,
        }
    }

    /// Truthiness used by bare `attr` conditions
    pub fn truthy(&self) -> bool {
        match self {
            Attribute::Text(s) => !s.is_empty(),
            Attribute::Number(n) => *n != 0.0,
            Attribute::Bool(b) => *b,
            Attribute::List(items) => !items.is_empty(),
        }
    }
}

/// Attribute names understood by [`PullRequestSnapshot::attribute`]
pub const ATTRIBUTES: &[&str] = &[
    "number",
    "base",
    "head",
    "author",
    "title",
    "body",
    "label",
    "files",
    "assignee",
    "review-requested",
    "approved-reviews-by",
    "changes-requested-reviews-by",
    "commented-reviews-by",
    "dismissed-reviews-by",
    "draft",
    "merged",
    "closed",
    "locked",
    "conflict",
    "mergeable-state",
];

impl PullRequestSnapshot {
    /// Resolve an attribute by name; `None` for names that do not exist
    pub fn attribute(&self, name: &str) -> Option<Attribute> {
        let value = match name {
            "number" => Attribute::Number(self.number as f64),
            "base" => Attribute::Text(self.base.clone()),
            "head" => Attribute::Text(self.head.clone()),
            "author" => Attribute::Text(self.author.clone()),
            "title" => Attribute::Text(self.title.clone()),
            "body" => Attribute::Text(self.body.clone().unwrap_or_default()),
            "label" => Attribute::List(self.labels.clone()),
            "files" => Attribute::List(self.files.clone()),
            "assignee" => Attribute::List(self.assignees.clone()),
            "review-requested" => Attribute::List(self.requested_reviewers.clone()),
            "approved-reviews-by" => Attribute::List(self.reviewers_in(ReviewState::Approved)),
            "changes-requested-reviews-by" => {
                Attribute::List(self.reviewers_in(ReviewState::ChangesRequested))
            }
            "dismissed-reviews-by" => Attribute::List(self.reviewers_in(ReviewState::Dismissed)),
            "commented-reviews-by" => Attribute::List(self.commented_reviewers()),
            "draft" => Attribute::Bool(self.draft),
            "merged" => Attribute::Bool(self.merged),
            "closed" => Attribute::Bool(self.closed),
            "locked" => Attribute::Bool(self.locked),
            "conflict" => Attribute::Bool(self.mergeable_state.as_deref() == Some("dirty")),
            "mergeable-state" => Attribute::Text(self.mergeable_state.clone().unwrap_or_default()),
            _ => return None,
        };
        Some(value)
    }

    /// Number of reviewers whose latest decisive review is an approval
    pub fn approval_count(&self) -> usize {
        self.reviewers_in(ReviewState::Approved).len()
    }

    /// Reviewers whose latest decisive review is in `state`, in first-seen order.
    ///
    /// Comments and pending reviews never override an earlier decision.
    fn reviewers_in(&self, state: ReviewState) -> Vec<String> {
        let mut latest: Vec<(&str, ReviewState)> = Vec::new();
        for review in &self.reviews {
            if matches!(review.state, ReviewState::Commented | ReviewState::Pending) {
                continue;
            }
            match latest.iter_mut().find(|(who, _)| *who == review.reviewer) {
                Some(entry) => entry.1 = review.state,
                None => latest.push((review.reviewer.as_str(), review.state)),
            }
        }
        latest
            .into_iter()
            .filter(|(_, s)| *s == state)
            .map(|(who, _)| who.to_string())
            .collect()
    }

    fn commented_reviewers(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for review in &self.reviews {
            if review.state == ReviewState::Commented && !out.contains(&review.reviewer) {
                out.push(review.reviewer.clone());
            }
        }
        out
    }

    /// Most recent review submitted by `reviewer`, whatever its state
    pub fn latest_review_by(&self, reviewer: &str) -> Option<&Review> {
        self.reviews.iter().rev().find(|r| r.reviewer == reviewer)
    }

    /// Most recent comment written by `author`
    pub fn latest_comment_by(&self, author: &str) -> Option<&Comment> {
        self.comments.iter().rev().find(|c| c.author == author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(who: &str, state: ReviewState) -> Review {
        Review {
            reviewer: who.to_string(),
            state,
            body: None,
            submitted_at: None,
        }
    }

    #[test]
    fn test_unknown_attribute_is_none() {
        let pr = PullRequestSnapshot::default();
        assert!(pr.attribute("nonexistent").is_none());
        for name in ATTRIBUTES {
            assert!(pr.attribute(name).is_some(), "{} should resolve", name);
        }
    }

    #[test]
    fn test_latest_decision_wins() {
        let pr = PullRequestSnapshot {
            reviews: vec![
                review("alice", ReviewState::Approved),
                review("bob", ReviewState::Approved),
                review("alice", ReviewState::ChangesRequested),
                review("bob", ReviewState::Commented),
            ],
            ..Default::default()
        };

        assert_eq!(
            pr.attribute("approved-reviews-by"),
            Some(Attribute::List(vec!["bob".to_string()]))
        );
        assert_eq!(
            pr.attribute("changes-requested-reviews-by"),
            Some(Attribute::List(vec!["alice".to_string()]))
        );
        assert_eq!(
            pr.attribute("commented-reviews-by"),
            Some(Attribute::List(vec!["bob".to_string()]))
        );
        assert_eq!(pr.approval_count(), 1);
    }

    #[test]
    fn test_conflict_from_mergeable_state() {
        let pr = PullRequestSnapshot {
            mergeable_state: Some("dirty".to_string()),
            ..Default::default()
        };
        assert_eq!(pr.attribute("conflict"), Some(Attribute::Bool(true)));
    }

    #[test]
    fn test_cardinality_and_truthiness() {
        assert_eq!(Attribute::List(vec!["a".into(), "b".into()]).cardinality(), 2.0);
        assert_eq!(Attribute::Text("héllo".into()).cardinality(), 5.0);
        assert!(!Attribute::List(vec![]).truthy());
        assert!(Attribute::Bool(true).truthy());
    }

    #[test]
    fn test_deserialize_partial_snapshot() {
        let json = r#"{
            "number": 4,
            "base": "main",
            "author": "alice",
            "reviews": [{"reviewer": "bot", "state": "APPROVED"}]
        }"#;
        let pr: PullRequestSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(pr.number, 4);
        assert_eq!(pr.reviews[0].state, ReviewState::Approved);
        assert!(pr.labels.is_empty());
    }

    #[test]
    fn test_review_type_event_names() {
        assert_eq!(ReviewType::RequestChanges.as_event(), "REQUEST_CHANGES");
        assert_eq!(ReviewType::default(), ReviewType::Approve);
        assert_eq!(
            ReviewType::Comment.resulting_state(),
            ReviewState::Commented
        );
    }
}
