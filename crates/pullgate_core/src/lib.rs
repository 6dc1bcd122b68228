//! # pullgate_core
//!
//! Reviewer-approval policy engine for pull requests.
//!
//! This crate provides:
//! - **Condition grammar**: small predicates over labels, title, base branch and files
//! - **Policy documents**: `.pullapprove.yml` overrides, gate conditions and reviewer groups
//! - **Group evaluation**: eligible reviews, stale approvals, rejections, label diffs
//! - **Status reduction**: one `pending` / `success` / `failure` / `error` verdict
//!
//! ## Example
//!
//! ```rust,ignore
//! use pullgate_core::{reduce, PolicyConfig, PullRequestContext, Review, Team, TeamIndex};
//!
//! let config = PolicyConfig::from_yaml(yaml)?;
//! let teams = TeamIndex::new(&[Team::new("backend", ["alice", "bob"])]);
//! let context = PullRequestContext::new("Add parser", "carol", "main", "abc123");
//! let reviews = vec![Review::approved("alice", "abc123")];
//!
//! let result = reduce(&config, &teams, &context, &reviews);
//! println!("{}: {}", result.state, result.description);
//! ```

pub mod condition;
pub mod config;
pub mod context;
pub mod error;
pub mod group;
pub mod reducer;
pub mod review;
pub mod team;

pub use condition::{evaluate, Condition, Expr, FileAnchor};
pub use config::{
    GateCondition, GroupConfig, GroupLabels, GroupStatus, OverrideRule, PolicyConfig, StatusValue,
    CONFIG_FILE_NAME, DEFAULT_EXPLANATION,
};
pub use context::{ChangeKind, FileChange, PullRequestContext, PullRequestState};
pub use error::{CoreError, CoreResult};
pub use group::{GroupEvaluator, GroupResult};
pub use reducer::{reduce, EvaluationResult};
pub use review::{latest_per_author, Review, ReviewState};
pub use team::{Team, TeamIndex};
