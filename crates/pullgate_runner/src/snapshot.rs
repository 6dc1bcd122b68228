//! File-backed pull request source.
//!
//! A snapshot is a JSON document holding everything fetched for one pull
//! request:
//!
//! ```json
//! {
//!   "pull_request": { "number": 42, "title": "...", "author_login": "carol", ... },
//!   "reviews": [{ "author_login": "alice", "state": "APPROVED", "commit_sha": "abc" }],
//!   "teams": [{ "name": "backend", "members": ["alice", "bob"] }]
//! }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pullgate_core::{PullRequestContext, Review, Team};

use crate::error::{RunnerError, RunnerResult};
use crate::source::PullRequestSource;

/// Everything fetched for one pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub pull_request: PullRequestContext,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> RunnerResult<Self> {
        serde_json::from_str(json).map_err(RunnerError::from)
    }

    pub fn from_file(path: &Path) -> RunnerResult<Self> {
        if !path.exists() {
            return Err(RunnerError::Snapshot(format!("file not found: {}", path.display())));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Serves a [`Snapshot`] and a policy file from disk.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: Snapshot,
    config_path: PathBuf,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot, config_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot,
            config_path: config_path.into(),
        }
    }

    pub fn from_files(snapshot_path: &Path, config_path: impl Into<PathBuf>) -> RunnerResult<Self> {
        Ok(Self::new(Snapshot::from_file(snapshot_path)?, config_path))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[async_trait]
impl PullRequestSource for SnapshotSource {
    async fn fetch_pull_request(&self, _owner: &str, _repo: &str, number: u64) -> RunnerResult<PullRequestContext> {
        let pull_request = &self.snapshot.pull_request;
        // Snapshots without a number serve any request.
        if pull_request.number != 0 && pull_request.number != number {
            return Err(RunnerError::collaborator(
                "fetch_pull_request",
                format!("snapshot holds #{}, not #{}", pull_request.number, number),
            ));
        }
        Ok(pull_request.clone())
    }

    async fn fetch_reviews(&self, _owner: &str, _repo: &str, _number: u64) -> RunnerResult<Vec<Review>> {
        Ok(self.snapshot.reviews.clone())
    }

    async fn fetch_teams(&self, _org: &str) -> RunnerResult<Vec<Team>> {
        Ok(self.snapshot.teams.clone())
    }

    async fn fetch_config(&self, _owner: &str, _repo: &str, git_ref: &str) -> RunnerResult<Option<String>> {
        debug!(path = %self.config_path.display(), git_ref, "Reading policy file");
        match tokio::fs::read_to_string(&self.config_path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RunnerError::Io(e)),
        }
    }
}
