//! Per-group review counting and classification.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{GroupConfig, GroupStatus};
use crate::context::PullRequestContext;
use crate::review::Review;
use crate::team::TeamIndex;

/// Outcome for one active group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupResult {
    pub name: String,
    pub required: u32,
    /// Approvals of the current head commit by eligible reviewers
    pub approved_reviews: Vec<Review>,
    /// Rejections by eligible reviewers, on any commit
    pub rejected_reviews: Vec<Review>,
    pub status: GroupStatus,
    pub add_labels: BTreeSet<String>,
    pub remove_labels: BTreeSet<String>,
}

impl GroupResult {
    pub fn approved_count(&self) -> usize {
        self.approved_reviews.len()
    }

    /// `core rejected` or `core 1/2`.
    pub fn summary(&self) -> String {
        match self.status {
            GroupStatus::Rejected => format!("{} rejected", self.name),
            _ => format!("{} {}/{}", self.name, self.approved_count(), self.required),
        }
    }
}

/// Evaluates reviewer groups against one pull request.
pub struct GroupEvaluator<'a> {
    context: &'a PullRequestContext,
    reviews: &'a [Review],
    teams: &'a TeamIndex,
}

impl<'a> GroupEvaluator<'a> {
    /// `reviews` must already hold only the latest review of each author.
    pub fn new(context: &'a PullRequestContext, reviews: &'a [Review], teams: &'a TeamIndex) -> Self {
        Self { context, reviews, teams }
    }

    /// Whether every activation condition of the group holds.
    pub fn is_active(&self, group: &GroupConfig) -> bool {
        match &group.conditions {
            None => true,
            Some(conditions) => conditions.iter().all(|c| c.evaluate(self.context)),
        }
    }

    /// Whether a review counts for the group.
    fn is_eligible(&self, group: &GroupConfig, review: &Review) -> bool {
        if review.author_login == self.context.author_login {
            return false;
        }
        group.reviewer_users.contains(&review.author_login)
            || self.teams.is_member_of_any(&review.author_login, &group.reviewer_teams)
    }

    /// Classify a group, or `None` when it is inactive for this pull request.
    pub fn evaluate(&self, group: &GroupConfig) -> Option<GroupResult> {
        if !self.is_active(group) {
            debug!(group = %group.name, "Group inactive, conditions not met");
            return None;
        }

        let eligible: Vec<&Review> = self
            .reviews
            .iter()
            .filter(|review| self.is_eligible(group, review))
            .collect();

        let approved_reviews: Vec<Review> = eligible
            .iter()
            .filter(|review| review.approves(&self.context.head_sha))
            .map(|review| (*review).clone())
            .collect();

        let rejected_reviews: Vec<Review> = eligible
            .iter()
            .filter(|review| review.state.is_rejection())
            .map(|review| (*review).clone())
            .collect();

        let status = classify(approved_reviews.len(), rejected_reviews.len(), group.required_approvals);
        let (add_labels, remove_labels) = label_diff(group, status);

        debug!(
            group = %group.name,
            eligible = eligible.len(),
            approved = approved_reviews.len(),
            rejected = rejected_reviews.len(),
            required = group.required_approvals,
            status = ?status,
            "Group evaluated"
        );

        Some(GroupResult {
            name: group.name.clone(),
            required: group.required_approvals,
            approved_reviews,
            rejected_reviews,
            status,
            add_labels,
            remove_labels,
        })
    }
}

/// Rejection takes precedence over missing approvals.
fn classify(approved: usize, rejected: usize, required: u32) -> GroupStatus {
    if rejected > 0 {
        GroupStatus::Rejected
    } else if approved < required as usize {
        GroupStatus::Pending
    } else {
        GroupStatus::Approved
    }
}

/// Label for the current status is added, labels for the other statuses removed.
fn label_diff(group: &GroupConfig, status: GroupStatus) -> (BTreeSet<String>, BTreeSet<String>) {
    let add: BTreeSet<String> = group.labels.for_status(status).map(str::to_string).into_iter().collect();

    let remove = GroupStatus::ALL
        .iter()
        .filter(|other| **other != status)
        .filter_map(|other| group.labels.for_status(*other))
        .filter(|label| !add.contains(*label))
        .map(str::to_string)
        .collect();

    (add, remove)
}
