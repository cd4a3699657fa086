// SPDX-License-Identifier: MIT

//! In-memory platform
//!
//! Holds one pull request and applies side effects to it the way the
//! hosting platform would. Used for dry runs and tests.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

use crate::engine::report::CheckRunReport;
use crate::kit::error::TransportError;
use crate::kit::platform::{Ack, Platform, SnapshotProvider};
use crate::kit::snapshot::{Comment, PullRequestSnapshot, Review, ReviewType};

#[derive(Debug, Default)]
struct MemoryState {
    snapshot: PullRequestSnapshot,
    /// (head sha, report), upserted by (sha, name)
    check_runs: Vec<(String, CheckRunReport)>,
    fail: bool,
    requests: usize,
    next_id: u64,
}

pub struct MemoryPlatform {
    identity: String,
    state: Mutex<MemoryState>,
}

impl MemoryPlatform {
    pub fn new(identity: impl Into<String>, snapshot: PullRequestSnapshot) -> Self {
        Self {
            identity: identity.into(),
            state: Mutex::new(MemoryState {
                snapshot,
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current state of the pull request, including applied side effects
    pub fn snapshot_now(&self) -> PullRequestSnapshot {
        self.lock().snapshot.clone()
    }

    /// Mutate the pull request as an outside actor would
    pub fn update<F: FnOnce(&mut PullRequestSnapshot)>(&self, f: F) {
        f(&mut self.lock().snapshot);
    }

    /// Make every subsequent request fail with a transport error
    pub fn fail_requests(&self, fail: bool) {
        self.lock().fail = fail;
    }

    /// Number of requests received, failed ones included
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }

    /// Check runs stored for `head_sha`, in creation order
    pub fn check_runs(&self, head_sha: &str) -> Vec<CheckRunReport> {
        self.lock()
            .check_runs
            .iter()
            .filter(|(sha, _)| sha == head_sha)
            .map(|(_, report)| report.clone())
            .collect()
    }

    /// Record a request and return the guard, or fail if requested
    fn begin(&self) -> Result<MutexGuard<'_, MemoryState>, TransportError> {
        let mut state = self.lock();
        state.requests += 1;
        if state.fail {
            return Err(TransportError::api("memory", "request failed"));
        }
        Ok(state)
    }
}

fn next_id(state: &mut MemoryState) -> u64 {
    let id = state.next_id;
    state.next_id += 1;
    id
}

#[async_trait]
impl SnapshotProvider for MemoryPlatform {
    async fn snapshot(&self, number: u64) -> Result<PullRequestSnapshot, TransportError> {
        let state = self.begin()?;
        if state.snapshot.number != number {
            return Err(TransportError::NotFound(number));
        }
        Ok(state.snapshot.clone())
    }
}

#[async_trait]
impl Platform for MemoryPlatform {
    fn identity(&self) -> &str {
        &self.identity
    }

    async fn submit_review(
        &self,
        number: u64,
        review_type: ReviewType,
        body: Option<&str>,
    ) -> Result<Ack, TransportError> {
        let mut state = self.begin()?;
        if state.snapshot.number != number {
            return Err(TransportError::NotFound(number));
        }
        let id = next_id(&mut state);
        state.snapshot.reviews.push(Review {
            reviewer: self.identity.clone(),
            state: review_type.resulting_state(),
            body: Some(body.unwrap_or_default().to_string()),
            submitted_at: Some(Utc::now()),
        });
        Ok(Ack { id })
    }

    async fn post_comment(&self, number: u64, body: &str) -> Result<Ack, TransportError> {
        let mut state = self.begin()?;
        if state.snapshot.number != number {
            return Err(TransportError::NotFound(number));
        }
        let id = next_id(&mut state);
        state.snapshot.comments.push(Comment {
            author: self.identity.clone(),
            body: body.to_string(),
        });
        Ok(Ack { id })
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), TransportError> {
        let mut state = self.begin()?;
        if state.snapshot.number != number {
            return Err(TransportError::NotFound(number));
        }
        for label in labels {
            if !state.snapshot.labels.contains(label) {
                state.snapshot.labels.push(label.clone());
            }
        }
        Ok(())
    }

    async fn remove_label(&self, number: u64, label: &str) -> Result<(), TransportError> {
        let mut state = self.begin()?;
        if state.snapshot.number != number {
            return Err(TransportError::NotFound(number));
        }
        state.snapshot.labels.retain(|l| l != label);
        Ok(())
    }

    async fn upsert_check_run(
        &self,
        head_sha: &str,
        report: &CheckRunReport,
    ) -> Result<(), TransportError> {
        let mut state = self.begin()?;
        let existing = state
            .check_runs
            .iter()
            .position(|(sha, r)| sha == head_sha && r.name == report.name);
        match existing {
            Some(i) => state.check_runs[i].1 = report.clone(),
            None => state
                .check_runs
                .push((head_sha.to_string(), report.clone())),
        }
        Ok(())
    }
}
