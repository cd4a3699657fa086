// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::report::CheckRunReport;
use crate::kit::error::TransportError;
use crate::kit::snapshot::{PullRequestSnapshot, ReviewType};

/// Acknowledgement returned by the platform for a created object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub id: u64,
}

/// Supplies the current state of a pull request.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn snapshot(&self, number: u64) -> Result<PullRequestSnapshot, TransportError>;
}

/// Trait for the hosting platform the engine acts upon.
///
/// Every method is a single fallible call. Retrying is the
/// implementation's business; the engine never retries.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Login of the automation account; reviews and comments it authored
    /// are used to detect already-applied actions
    fn identity(&self) -> &str;

    async fn submit_review(
        &self,
        number: u64,
        review_type: ReviewType,
        body: Option<&str>,
    ) -> Result<Ack, TransportError>;

    async fn post_comment(&self, number: u64, body: &str) -> Result<Ack, TransportError>;

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), TransportError>;

    async fn remove_label(&self, number: u64, label: &str) -> Result<(), TransportError>;

    /// Create or update the check run named `report.name` on `head_sha`
    async fn upsert_check_run(
        &self,
        head_sha: &str,
        report: &CheckRunReport,
    ) -> Result<(), TransportError>;
}
