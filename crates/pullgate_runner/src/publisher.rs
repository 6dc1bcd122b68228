//! Publishing commit statuses and labels.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use pullgate_core::StatusValue;

use crate::error::RunnerResult;

/// Context name of the published commit status; re-runs update the same check.
pub const STATUS_CONTEXT: &str = "pullapprove2";

/// Sink for the verdict of a run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusPublisher: Send + Sync {
    /// Set the commit status of `sha`.
    async fn publish_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        state: StatusValue,
        description: &str,
        context: &str,
    ) -> RunnerResult<()>;

    /// Replace the labels of a pull request.
    async fn publish_labels(&self, owner: &str, repo: &str, number: u64, labels: &BTreeSet<String>) -> RunnerResult<()>;
}

/// A status captured by [`RecordingPublisher`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishedStatus {
    pub owner: String,
    pub repo: String,
    pub sha: String,
    pub state: StatusValue,
    pub description: String,
    pub context: String,
}

/// A label set captured by [`RecordingPublisher`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishedLabels {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub labels: BTreeSet<String>,
}

/// Publisher that keeps everything in memory.
///
/// Clones share the same records, so a clone handed to a run can be
/// inspected afterwards.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    statuses: Arc<RwLock<Vec<PublishedStatus>>>,
    labels: Arc<RwLock<Vec<PublishedLabels>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<PublishedStatus> {
        self.statuses.read().clone()
    }

    pub fn labels(&self) -> Vec<PublishedLabels> {
        self.labels.read().clone()
    }

    pub fn last_status(&self) -> Option<PublishedStatus> {
        self.statuses.read().last().cloned()
    }

    pub fn last_labels(&self) -> Option<PublishedLabels> {
        self.labels.read().last().cloned()
    }

    pub fn clear(&self) {
        self.statuses.write().clear();
        self.labels.write().clear();
    }
}

#[async_trait]
impl StatusPublisher for RecordingPublisher {
    async fn publish_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        state: StatusValue,
        description: &str,
        context: &str,
    ) -> RunnerResult<()> {
        self.statuses.write().push(PublishedStatus {
            owner: owner.to_string(),
            repo: repo.to_string(),
            sha: sha.to_string(),
            state,
            description: description.to_string(),
            context: context.to_string(),
        });
        Ok(())
    }

    async fn publish_labels(&self, owner: &str, repo: &str, number: u64, labels: &BTreeSet<String>) -> RunnerResult<()> {
        self.labels.write().push(PublishedLabels {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            labels: labels.clone(),
        });
        Ok(())
    }
}

/// Publisher that prints what would be sent to the hosting platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutPublisher;

#[async_trait]
impl StatusPublisher for StdoutPublisher {
    async fn publish_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        state: StatusValue,
        description: &str,
        context: &str,
    ) -> RunnerResult<()> {
        let icon = match state {
            StatusValue::Success => "✅",
            StatusValue::Pending => "⏳",
            StatusValue::Failure | StatusValue::Error => "❌",
        };
        println!("{} {}/{}@{} [{}] {}: {}", icon, owner, repo, sha, context, state, description);
        Ok(())
    }

    async fn publish_labels(&self, owner: &str, repo: &str, number: u64, labels: &BTreeSet<String>) -> RunnerResult<()> {
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        println!("🏷️  {}/{}#{} labels: [{}]", owner, repo, number, labels.join(", "));
        Ok(())
    }
}
