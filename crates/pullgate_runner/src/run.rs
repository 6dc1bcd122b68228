//! One evaluation of one pull request: fetch, reduce, publish.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use pullgate_core::{
    reduce, CoreError, EvaluationResult, PolicyConfig, StatusValue, TeamIndex, CONFIG_FILE_NAME,
};

use crate::error::{RunnerError, RunnerResult};
use crate::publisher::{StatusPublisher, STATUS_CONTEXT};
use crate::source::{PullRequestSource, PullRequestTarget};

/// Record of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub target: PullRequestTarget,
    /// Commit the status was published on
    pub head_sha: String,
    pub result: EvaluationResult,
    /// Label set published for the pull request
    pub labels: BTreeSet<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Evaluate a pull request and publish the verdict.
///
/// Collaborator failures propagate and nothing is published. A missing or
/// malformed policy document is published as an `error` status before the
/// error is returned.
pub async fn run_for_pull_request<S, P>(source: &S, publisher: &P, target: &PullRequestTarget) -> RunnerResult<RunReport>
where
    S: PullRequestSource + ?Sized,
    P: StatusPublisher + ?Sized,
{
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!(%run_id, target = %target, "Evaluating pull request");

    let context = source
        .fetch_pull_request(&target.owner, &target.repo, target.number)
        .await?;

    let config = match load_config(source, target, &context.default_branch).await? {
        Ok(config) => config,
        Err(e) => {
            error!(%run_id, error = %e, "Policy document unusable");
            publisher
                .publish_status(
                    &target.owner,
                    &target.repo,
                    &context.head_sha,
                    StatusValue::Error,
                    &e.to_string(),
                    STATUS_CONTEXT,
                )
                .await?;
            return Err(RunnerError::Policy(e));
        }
    };

    for condition in config.unrecognized_conditions() {
        warn!(%run_id, condition = %condition, "Condition matches no known form");
    }

    let reviews = source
        .fetch_reviews(&target.owner, &target.repo, target.number)
        .await?;
    let teams = source.fetch_teams(&target.owner).await?;
    info!(%run_id, reviews = reviews.len(), teams = teams.len(), "Inputs fetched");

    let index = TeamIndex::new(&teams);
    let result = reduce(&config, &index, &context, &reviews);

    publisher
        .publish_status(
            &target.owner,
            &target.repo,
            &context.head_sha,
            result.state,
            &result.description,
            STATUS_CONTEXT,
        )
        .await?;

    let labels = result.apply_labels(&context.labels);
    publisher
        .publish_labels(&target.owner, &target.repo, target.number, &labels)
        .await?;

    info!(%run_id, state = %result.state, "Verdict published");

    Ok(RunReport {
        run_id,
        target: target.clone(),
        head_sha: context.head_sha,
        result,
        labels,
        started_at,
        completed_at: Utc::now(),
    })
}

/// Outer error: the fetch failed. Inner error: the document is missing or malformed.
async fn load_config<S>(
    source: &S,
    target: &PullRequestTarget,
    git_ref: &str,
) -> RunnerResult<Result<PolicyConfig, CoreError>>
where
    S: PullRequestSource + ?Sized,
{
    let raw = source.fetch_config(&target.owner, &target.repo, git_ref).await?;
    Ok(match raw {
        Some(yaml) => PolicyConfig::from_yaml(&yaml),
        None => Err(CoreError::ConfigMissing(format!("{} at {}", CONFIG_FILE_NAME, git_ref))),
    })
}
