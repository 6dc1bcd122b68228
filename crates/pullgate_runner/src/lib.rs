//! # pullgate_runner
//!
//! Collaborator seams and run orchestration for pullgate.
//!
//! The approval engine in `pullgate_core` is pure. This crate supplies what
//! surrounds it:
//! - [`PullRequestSource`]: where pull requests, reviews, teams and policy files come from
//! - [`StatusPublisher`]: where the verdict and label set go
//! - [`SnapshotSource`]: a source backed by a JSON snapshot and a policy file on disk
//! - [`RecordingPublisher`] / [`StdoutPublisher`]: in-memory and printing sinks
//! - [`run_for_pull_request`]: fetch, evaluate, publish

pub mod error;
pub mod publisher;
pub mod run;
pub mod snapshot;
pub mod source;

pub use error::{RunnerError, RunnerResult};
pub use publisher::{
    PublishedLabels, PublishedStatus, RecordingPublisher, StatusPublisher, StdoutPublisher, STATUS_CONTEXT,
};
pub use run::{run_for_pull_request, RunReport};
pub use snapshot::{Snapshot, SnapshotSource};
pub use source::{PullRequestSource, PullRequestTarget};
