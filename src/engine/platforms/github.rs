// SPDX-License-Identifier: MIT

//! GitHub platform backed by octocrab

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::{Octocrab, Page};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;
use std::sync::Arc;

use crate::engine::report::{CheckRunReport, Conclusion};
use crate::kit::error::TransportError;
use crate::kit::platform::{Ack, Platform, SnapshotProvider};
use crate::kit::snapshot::{Comment, PullRequestSnapshot, Review, ReviewState, ReviewType};

const PER_PAGE: u8 = 100;

// --- REST payloads ---

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    #[serde(rename = "ref")]
    ref_name: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawPull {
    number: u64,
    state: String,
    title: Option<String>,
    body: Option<String>,
    user: Option<RawUser>,
    base: RawRef,
    head: RawRef,
    #[serde(default)]
    labels: Vec<RawLabel>,
    #[serde(default)]
    draft: bool,
    merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    locked: bool,
    mergeable_state: Option<String>,
    #[serde(default)]
    assignees: Vec<RawUser>,
    #[serde(default)]
    requested_reviewers: Vec<RawUser>,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    user: Option<RawUser>,
    state: ReviewState,
    body: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    user: Option<RawUser>,
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFile {
    filename: String,
}

#[derive(Debug, Deserialize)]
struct RawId {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RawCheckRuns {
    check_runs: Vec<RawId>,
}

fn into_snapshot(
    pull: RawPull,
    reviews: Vec<RawReview>,
    comments: Vec<RawComment>,
    files: Vec<String>,
) -> PullRequestSnapshot {
    let login = |u: Option<RawUser>| u.map(|u| u.login).unwrap_or_default();
    PullRequestSnapshot {
        number: pull.number,
        base: pull.base.ref_name,
        head: pull.head.ref_name,
        head_sha: pull.head.sha,
        author: login(pull.user),
        title: pull.title.unwrap_or_default(),
        body: pull.body,
        labels: pull.labels.into_iter().map(|l| l.name).collect(),
        draft: pull.draft,
        merged: pull.merged_at.is_some(),
        closed: pull.state == "closed",
        locked: pull.locked,
        mergeable_state: pull.mergeable_state,
        files,
        assignees: pull.assignees.into_iter().map(|u| u.login).collect(),
        requested_reviewers: pull
            .requested_reviewers
            .into_iter()
            .map(|u| u.login)
            .collect(),
        reviews: reviews
            .into_iter()
            .map(|r| Review {
                reviewer: login(r.user),
                state: r.state,
                body: r.body,
                submitted_at: r.submitted_at,
            })
            .collect(),
        comments: comments
            .into_iter()
            .map(|c| Comment {
                author: login(c.user),
                body: c.body.unwrap_or_default(),
            })
            .collect(),
    }
}

fn check_run_payload(head_sha: &str, report: &CheckRunReport) -> Value {
    let mut payload = json!({
        "name": report.name,
        "head_sha": head_sha,
        "output": {
            "title": report.title,
            "summary": report.summary,
        },
    });
    match report.conclusion {
        Conclusion::Pending => {
            payload["status"] = json!("in_progress");
        }
        Conclusion::Success => {
            payload["status"] = json!("completed");
            payload["conclusion"] = json!("success");
        }
        Conclusion::Failure => {
            payload["status"] = json!("completed");
            payload["conclusion"] = json!("failure");
        }
    }
    payload
}

// --- Platform ---

pub struct GitHubPlatform {
    octocrab: Arc<Octocrab>,
    owner: String,
    repo: String,
    identity: String,
}

impl GitHubPlatform {
    pub fn new(octocrab: Arc<Octocrab>, owner: String, repo: String, identity: String) -> Self {
        Self {
            octocrab,
            owner,
            repo,
            identity,
        }
    }

    /// Build from `GITHUB_TOKEN`, `GITHUB_ORG`, `GITHUB_REPO` and, optionally,
    /// `GITHUB_BOT_LOGIN` (otherwise the authenticated user's login)
    pub async fn from_env() -> Result<Self, TransportError> {
        let var = |name: &str| {
            env::var(name).map_err(|_| TransportError::Config(format!("{} must be set", name)))
        };
        let token = var("GITHUB_TOKEN")?;
        let owner = var("GITHUB_ORG")?;
        let repo = var("GITHUB_REPO")?;

        let octocrab = Arc::new(Octocrab::builder().personal_token(token).build()?);
        let identity = match env::var("GITHUB_BOT_LOGIN") {
            Ok(login) => login,
            Err(_) => octocrab.current().user().await?.login,
        };
        log::info!("GitHub platform for {}/{} acting as {}", owner, repo, identity);

        Ok(Self::new(octocrab, owner, repo, identity))
    }

    fn route(&self, path: &str) -> String {
        format!("/repos/{}/{}/{}", self.owner, self.repo, path)
    }

    /// Every item of a paginated list, oldest first
    async fn all_pages<T>(&self, path: &str) -> Result<Vec<T>, TransportError>
    where
        T: DeserializeOwned + Send,
    {
        let first: Page<T> = self
            .octocrab
            .get(self.route(path), Some(&[("per_page", PER_PAGE)][..]))
            .await?;
        Ok(self.octocrab.all_pages(first).await?)
    }
}

#[async_trait]
impl SnapshotProvider for GitHubPlatform {
    async fn snapshot(&self, number: u64) -> Result<PullRequestSnapshot, TransportError> {
        let pull: RawPull = self
            .octocrab
            .get(self.route(&format!("pulls/{}", number)), None::<&()>)
            .await?;
        let reviews: Vec<RawReview> = self.all_pages(&format!("pulls/{}/reviews", number)).await?;
        let comments: Vec<RawComment> =
            self.all_pages(&format!("issues/{}/comments", number)).await?;
        let files: Vec<RawFile> = self.all_pages(&format!("pulls/{}/files", number)).await?;
        let files = files.into_iter().map(|f| f.filename).collect();

        Ok(into_snapshot(pull, reviews, comments, files))
    }
}

#[async_trait]
impl Platform for GitHubPlatform {
    fn identity(&self) -> &str {
        &self.identity
    }

    async fn submit_review(
        &self,
        number: u64,
        review_type: ReviewType,
        body: Option<&str>,
    ) -> Result<Ack, TransportError> {
        let mut payload = json!({ "event": review_type.as_event() });
        if let Some(body) = body {
            payload["body"] = json!(body);
        }
        let created: RawId = self
            .octocrab
            .post(self.route(&format!("pulls/{}/reviews", number)), Some(&payload))
            .await?;
        Ok(Ack { id: created.id })
    }

    async fn post_comment(&self, number: u64, body: &str) -> Result<Ack, TransportError> {
        let created: RawId = self
            .octocrab
            .post(
                self.route(&format!("issues/{}/comments", number)),
                Some(&json!({ "body": body })),
            )
            .await?;
        Ok(Ack { id: created.id })
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), TransportError> {
        self.octocrab
            .issues(&self.owner, &self.repo)
            .add_labels(number, labels)
            .await?;
        Ok(())
    }

    async fn remove_label(&self, number: u64, label: &str) -> Result<(), TransportError> {
        self.octocrab
            .issues(&self.owner, &self.repo)
            .remove_label(number, label)
            .await?;
        Ok(())
    }

    async fn upsert_check_run(
        &self,
        head_sha: &str,
        report: &CheckRunReport,
    ) -> Result<(), TransportError> {
        let existing: RawCheckRuns = self
            .octocrab
            .get(
                self.route(&format!("commits/{}/check-runs", head_sha)),
                Some(&[("check_name", report.name.as_str())][..]),
            )
            .await?;
        let payload = check_run_payload(head_sha, report);

        match existing.check_runs.first() {
            Some(run) => {
                let _: Value = self
                    .octocrab
                    .patch(self.route(&format!("check-runs/{}", run.id)), Some(&payload))
                    .await?;
            }
            None => {
                let _: Value = self
                    .octocrab
                    .post(self.route("check-runs"), Some(&payload))
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::header;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    const BOT: &str = "prflow-bot";

    async fn pull() -> Json<Value> {
        Json(json!({
            "number": 1,
            "state": "open",
            "title": "Busy pull request",
            "user": {"login": "alice"},
            "base": {"ref": "main", "sha": "base-sha"},
            "head": {"ref": "feature", "sha": "head-sha"}
        }))
    }

    /// Two pages of reviews; the automation's own review is on the second
    async fn reviews(
        State(base): State<String>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Response {
        if query.get("page").map(String::as_str) == Some("2") {
            return Json(json!([
                {"user": {"login": BOT}, "state": "APPROVED", "body": ""}
            ]))
            .into_response();
        }
        let first: Vec<Value> = (0..100)
            .map(|i| {
                json!({
                    "user": {"login": format!("reviewer-{}", i)},
                    "state": "COMMENTED",
                    "body": "nit"
                })
            })
            .collect();
        let next = format!(
            "<{}/repos/o/r/pulls/1/reviews?per_page=100&page=2>; rel=\"next\"",
            base
        );
        ([(header::LINK, next)], Json(Value::Array(first))).into_response()
    }

    async fn comments() -> Json<Value> {
        Json(json!([{"user": {"login": BOT}, "body": "Thanks alice"}]))
    }

    async fn files() -> Json<Value> {
        Json(json!([{"filename": "src/lib.rs"}, {"filename": "README.md"}]))
    }

    /// Local stand-in for the GitHub REST API
    async fn fake_github() -> GitHubPlatform {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let app = Router::new()
            .route("/repos/o/r/pulls/1", get(pull))
            .route("/repos/o/r/pulls/1/reviews", get(reviews))
            .route("/repos/o/r/issues/1/comments", get(comments))
            .route("/repos/o/r/pulls/1/files", get(files))
            .with_state(base.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let octocrab = Octocrab::builder()
            .base_uri(base)
            .unwrap()
            .build()
            .unwrap();
        GitHubPlatform::new(
            Arc::new(octocrab),
            "o".to_string(),
            "r".to_string(),
            BOT.to_string(),
        )
    }

    #[tokio::test]
    async fn test_snapshot_reads_every_page() {
        let platform = fake_github().await;
        let pr = platform.snapshot(1).await.unwrap();

        assert_eq!(pr.reviews.len(), 101);
        let latest = pr.latest_review_by(BOT).unwrap();
        assert_eq!(latest.state, ReviewState::Approved);
        assert_eq!(pr.approval_count(), 1);
        assert_eq!(pr.comments[0].body, "Thanks alice");
        assert_eq!(pr.files, vec!["src/lib.rs", "README.md"]);
        assert_eq!(pr.head_sha, "head-sha");
    }

    #[test]
    fn test_into_snapshot() {
        let pull: RawPull = serde_json::from_value(json!({
            "number": 12,
            "state": "open",
            "title": "Add login",
            "body": null,
            "user": {"login": "alice"},
            "base": {"ref": "main", "sha": "base-sha"},
            "head": {"ref": "feature", "sha": "head-sha"},
            "labels": [{"name": "bug"}],
            "draft": false,
            "merged_at": null,
            "locked": false,
            "mergeable_state": "clean",
            "assignees": [],
            "requested_reviewers": [{"login": "bob"}]
        }))
        .unwrap();
        let reviews: Vec<RawReview> = serde_json::from_value(json!([
            {"user": {"login": "prflow-bot"}, "state": "APPROVED", "body": "",
             "submitted_at": "2024-01-01T00:00:00Z"}
        ]))
        .unwrap();
        let comments: Vec<RawComment> =
            serde_json::from_value(json!([{"user": {"login": "carol"}, "body": "hi"}])).unwrap();

        let pr = into_snapshot(pull, reviews, comments, vec!["src/lib.rs".to_string()]);
        assert_eq!(pr.number, 12);
        assert_eq!(pr.base, "main");
        assert_eq!(pr.head_sha, "head-sha");
        assert_eq!(pr.author, "alice");
        assert_eq!(pr.labels, vec!["bug"]);
        assert!(!pr.closed);
        assert_eq!(pr.requested_reviewers, vec!["bob"]);
        assert_eq!(pr.approval_count(), 1);
        assert_eq!(pr.comments[0].author, "carol");
    }

    #[test]
    fn test_check_run_payload() {
        let report = CheckRunReport {
            name: "Rule: review (review)".to_string(),
            title: "Invalid review message".to_string(),
            summary: "oops".to_string(),
            conclusion: Conclusion::Failure,
        };
        let payload = check_run_payload("sha", &report);
        assert_eq!(payload["status"], "completed");
        assert_eq!(payload["conclusion"], "failure");
        assert_eq!(payload["output"]["title"], "Invalid review message");

        let pending = CheckRunReport {
            conclusion: Conclusion::Pending,
            ..report
        };
        let payload = check_run_payload("sha", &pending);
        assert_eq!(payload["status"], "in_progress");
        assert!(payload.get("conclusion").is_none());
    }
}
