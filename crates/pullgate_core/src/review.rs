//! Reviews and per-author de-duplication.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// State of a submitted review.
///
/// Hosting APIs report these in upper case (`CHANGES_REQUESTED`); both
/// spellings are accepted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    #[serde(alias = "APPROVED")]
    Approved,
    #[serde(alias = "REJECTED")]
    Rejected,
    #[serde(alias = "CHANGES_REQUESTED")]
    ChangesRequested,
    #[serde(alias = "DISMISSED")]
    Dismissed,
    /// Commented, pending and anything else the host reports
    #[serde(other)]
    Other,
}

impl ReviewState {
    /// Whether this state blocks the group regardless of the reviewed commit.
    pub fn is_rejection(self) -> bool {
        matches!(self, ReviewState::Rejected | ReviewState::ChangesRequested)
    }
}

/// A review left on a pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    pub author_login: String,
    pub state: ReviewState,
    /// Commit the review was submitted against
    pub commit_sha: String,
}

impl Review {
    pub fn new(author_login: impl Into<String>, state: ReviewState, commit_sha: impl Into<String>) -> Self {
        Self {
            author_login: author_login.into(),
            state,
            commit_sha: commit_sha.into(),
        }
    }

    pub fn approved(author_login: impl Into<String>, commit_sha: impl Into<String>) -> Self {
        Self::new(author_login, ReviewState::Approved, commit_sha)
    }

    pub fn changes_requested(author_login: impl Into<String>, commit_sha: impl Into<String>) -> Self {
        Self::new(author_login, ReviewState::ChangesRequested, commit_sha)
    }

    /// An approval that targets the given head commit.
    pub fn approves(&self, head_sha: &str) -> bool {
        self.state == ReviewState::Approved && self.commit_sha == head_sha
    }
}

/// Keep only the latest review of every author.
///
/// `reviews` must be in chronological order. The result keeps the order in
/// which each author first appeared.
pub fn latest_per_author(reviews: &[Review]) -> Vec<Review> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut latest: Vec<Review> = Vec::new();

    for review in reviews {
        match slots.get(review.author_login.as_str()) {
            Some(&slot) => latest[slot] = review.clone(),
            None => {
                slots.insert(review.author_login.as_str(), latest.len());
                latest.push(review.clone());
            }
        }
    }

    latest
}
