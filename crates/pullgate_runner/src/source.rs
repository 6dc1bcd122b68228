//! Data source trait for pull request inputs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pullgate_core::{PullRequestContext, Review, Team};

use crate::error::RunnerResult;

/// The pull request a run evaluates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestTarget {
    /// Repository owner; also the organization whose teams are consulted
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestTarget {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }
}

impl std::fmt::Display for PullRequestTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Source of everything an evaluation needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Fetch pull request metadata including the changed files.
    async fn fetch_pull_request(&self, owner: &str, repo: &str, number: u64) -> RunnerResult<PullRequestContext>;

    /// Fetch every review in chronological order, not de-duplicated.
    async fn fetch_reviews(&self, owner: &str, repo: &str, number: u64) -> RunnerResult<Vec<Review>>;

    /// Fetch the team roster of an organization.
    async fn fetch_teams(&self, org: &str) -> RunnerResult<Vec<Team>>;

    /// Fetch the raw policy document at `git_ref`; `None` when it does not exist.
    async fn fetch_config(&self, owner: &str, repo: &str, git_ref: &str) -> RunnerResult<Option<String>>;
}
