//! Pull request snapshot consulted by conditions and group evaluation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestState {
    #[default]
    Open,
    Closed,
    #[serde(other)]
    Other,
}

/// How a file was touched by the pull request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    #[default]
    Modified,
    Renamed,
    Copied,
    Changed,
    Unchanged,
}

/// A single changed file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    #[serde(default)]
    pub change_kind: ChangeKind,
}

impl FileChange {
    pub fn new(path: impl Into<String>, change_kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            change_kind,
        }
    }

    pub fn modified(path: impl Into<String>) -> Self {
        Self::new(path, ChangeKind::Modified)
    }
}

/// Immutable snapshot of a pull request for the duration of one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestContext {
    /// Pull request number
    #[serde(default)]
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub state: PullRequestState,
    /// Login of the pull request author
    pub author_login: String,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    /// Branch the pull request merges into
    pub base_branch: String,
    pub head_branch: String,
    /// Commit the pull request currently points at
    pub head_sha: String,
    /// Default branch of the head repository, where the policy file is read from
    #[serde(default = "default_branch")]
    pub default_branch: String,
    #[serde(default)]
    pub files: Vec<FileChange>,
}

fn default_branch() -> String {
    "main".to_string()
}

impl PullRequestContext {
    /// Create an open pull request with no labels or files.
    pub fn new(
        title: impl Into<String>,
        author_login: impl Into<String>,
        base_branch: impl Into<String>,
        head_sha: impl Into<String>,
    ) -> Self {
        Self {
            number: 0,
            title: title.into(),
            state: PullRequestState::Open,
            author_login: author_login.into(),
            labels: BTreeSet::new(),
            base_branch: base_branch.into(),
            head_branch: String::new(),
            head_sha: head_sha.into(),
            default_branch: default_branch(),
            files: Vec::new(),
        }
    }

    pub fn with_number(mut self, number: u64) -> Self {
        self.number = number;
        self
    }

    pub fn with_head_branch(mut self, branch: impl Into<String>) -> Self {
        self.head_branch = branch.into();
        self
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.files.push(FileChange::modified(path));
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Iterate over the changed file paths in diff order.
    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }
}
