//! Status reduction: overrides, gates, then reviewer groups.
//!
//! The reducer is a pure function over already fetched inputs. It never
//! fails; a malformed condition degrades to an unmet condition.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{GroupStatus, PolicyConfig, StatusValue};
use crate::context::PullRequestContext;
use crate::group::{GroupEvaluator, GroupResult};
use crate::review::{latest_per_author, Review};
use crate::team::TeamIndex;

/// Final verdict for a pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluationResult {
    pub state: StatusValue,
    pub description: String,
    pub labels_to_add: BTreeSet<String>,
    pub labels_to_remove: BTreeSet<String>,
    /// Active groups in declaration order; empty when a rule short-circuited
    #[serde(default)]
    pub groups: Vec<GroupResult>,
}

impl EvaluationResult {
    /// Result of a fired override or gate: no label changes.
    pub fn short_circuit(state: StatusValue, description: impl Into<String>) -> Self {
        Self {
            state,
            description: description.into(),
            labels_to_add: BTreeSet::new(),
            labels_to_remove: BTreeSet::new(),
            groups: Vec::new(),
        }
    }

    /// Aggregate the results of every active group.
    pub fn from_groups(groups: Vec<GroupResult>) -> Self {
        let state = if groups.iter().any(|g| g.status == GroupStatus::Rejected) {
            StatusValue::Failure
        } else if groups.iter().any(|g| g.status == GroupStatus::Pending) {
            StatusValue::Pending
        } else {
            StatusValue::Success
        };

        let description = groups
            .iter()
            .map(GroupResult::summary)
            .collect::<Vec<_>>()
            .join(", ");

        let labels_to_add = groups.iter().flat_map(|g| g.add_labels.iter().cloned()).collect();
        let labels_to_remove = groups.iter().flat_map(|g| g.remove_labels.iter().cloned()).collect();

        Self {
            state,
            description,
            labels_to_add,
            labels_to_remove,
            groups,
        }
    }

    /// Label set after applying this result: `current - remove + add`.
    pub fn apply_labels(&self, current: &BTreeSet<String>) -> BTreeSet<String> {
        current
            .iter()
            .filter(|label| !self.labels_to_remove.contains(*label))
            .chain(self.labels_to_add.iter())
            .cloned()
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.state == StatusValue::Success
    }
}

/// Evaluate a pull request against a policy.
///
/// `reviews` are in chronological order and may hold several reviews per
/// author; only the latest one of each author is considered.
pub fn reduce(
    config: &PolicyConfig,
    teams: &TeamIndex,
    context: &PullRequestContext,
    reviews: &[Review],
) -> EvaluationResult {
    let reviews = latest_per_author(reviews);

    for rule in &config.overrides {
        if let Some(condition) = &rule.condition {
            if !condition.evaluate(context) {
                info!(condition = %condition, state = %rule.resulting_state, "Override fired");
                return EvaluationResult::short_circuit(rule.resulting_state, rule.explanation.clone());
            }
        }
    }

    for gate in &config.conditions {
        if let Some(condition) = &gate.condition {
            if !condition.evaluate(context) {
                info!(condition = %condition, state = %gate.unmet_state, "Gate condition unmet");
                return EvaluationResult::short_circuit(gate.unmet_state, gate.explanation.clone());
            }
        }
    }

    let evaluator = GroupEvaluator::new(context, &reviews, teams);
    let groups: Vec<GroupResult> = config.groups.iter().filter_map(|g| evaluator.evaluate(g)).collect();

    debug!(
        active = groups.len(),
        configured = config.groups.len(),
        "Groups evaluated"
    );

    let result = EvaluationResult::from_groups(groups);
    info!(state = %result.state, description = %result.description, "Pull request evaluated");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GateCondition, GroupConfig, OverrideRule, DEFAULT_EXPLANATION};
    use crate::review::ReviewState;
    use crate::team::Team;

    const HEAD: &str = "head";

    fn context() -> PullRequestContext {
        PullRequestContext::new("Add feature", "carol", "develop", HEAD).with_file("src/lib.rs")
    }

    fn teams() -> TeamIndex {
        TeamIndex::new(&[Team::new("backend", ["alice", "bob"])])
    }

    fn group_with_status(name: &str, status: GroupStatus) -> GroupResult {
        GroupResult {
            name: name.to_string(),
            required: 1,
            approved_reviews: Vec::new(),
            rejected_reviews: Vec::new(),
            status,
            add_labels: BTreeSet::new(),
            remove_labels: BTreeSet::new(),
        }
    }

    #[test]
    fn test_overall_state_priority_for_all_pairs() {
        use GroupStatus::*;

        for first in GroupStatus::ALL {
            for second in GroupStatus::ALL {
                let result =
                    EvaluationResult::from_groups(vec![group_with_status("a", first), group_with_status("b", second)]);

                let expected = if first == Rejected || second == Rejected {
                    StatusValue::Failure
                } else if first == Pending || second == Pending {
                    StatusValue::Pending
                } else {
                    StatusValue::Success
                };
                assert_eq!(result.state, expected, "{:?} + {:?}", first, second);
            }
        }
    }

    #[test]
    fn test_no_groups_is_success_with_empty_description() {
        let result = reduce(&PolicyConfig::new(), &teams(), &context(), &[]);
        assert_eq!(result.state, StatusValue::Success);
        assert_eq!(result.description, "");
    }

    #[test]
    fn test_override_short_circuits_before_groups() {
        let config = PolicyConfig::new()
            .with_override(OverrideRule::new("base.ref == 'main'", StatusValue::Failure, "Only main"))
            .with_group(GroupConfig::new("core", 1).with_team("backend"));

        let result = reduce(&config, &teams(), &context(), &[Review::approved("alice", HEAD)]);

        assert_eq!(result.state, StatusValue::Failure);
        assert_eq!(result.description, "Only main");
        assert!(result.groups.is_empty());
        assert!(result.labels_to_add.is_empty());
    }

    #[test]
    fn test_first_unmet_override_wins() {
        let config = PolicyConfig::new()
            .with_override(OverrideRule::new("base.ref == 'develop'", StatusValue::Error, "met"))
            .with_override(OverrideRule::new("'x' in labels", StatusValue::Pending, "second"))
            .with_override(OverrideRule::new("'y' in labels", StatusValue::Error, "third"));

        let result = reduce(&config, &teams(), &context(), &[]);

        assert_eq!(result.state, StatusValue::Pending);
        assert_eq!(result.description, "second");
    }

    #[test]
    fn test_override_without_condition_never_fires() {
        let yaml = "overrides:\n  - status: error\n";
        let config = PolicyConfig::from_yaml(yaml).unwrap();

        let result = reduce(&config, &teams(), &context(), &[]);

        assert_eq!(result.state, StatusValue::Success);
    }

    #[test]
    fn test_blank_override_and_gate_never_fire() {
        let yaml = "overrides:\n  - if: ''\n    status: error\npullapprove_conditions:\n  - condition:\n";
        let config = PolicyConfig::from_yaml(yaml).unwrap();

        let result = reduce(&config, &teams(), &context(), &[]);

        assert_eq!(result.state, StatusValue::Success);
    }

    #[test]
    fn test_blank_explanation_and_status_use_defaults() {
        let yaml = "overrides:\n  - if: \"'hotfix' in labels\"\n    status:\n    explanation: ''\n";
        let config = PolicyConfig::from_yaml(yaml).unwrap();

        let result = reduce(&config, &teams(), &context(), &[]);

        assert_eq!(result.state, StatusValue::Failure);
        assert_eq!(result.description, DEFAULT_EXPLANATION);
    }

    #[test]
    fn test_overrides_run_before_gates() {
        let config = PolicyConfig::new()
            .with_gate(GateCondition::new("'gate' in labels", StatusValue::Pending, "gate"))
            .with_override(OverrideRule::new("'override' in labels", StatusValue::Error, "override"));

        let result = reduce(&config, &teams(), &context(), &[]);

        assert_eq!(result.state, StatusValue::Error);
        assert_eq!(result.description, "override");
    }

    #[test]
    fn test_gate_uses_defaults() {
        let yaml = "pullapprove_conditions:\n  - condition: \"'WIP' not in title\"\n";
        let config = PolicyConfig::from_yaml(yaml).unwrap();
        let ctx = PullRequestContext::new("WIP: later", "carol", "main", HEAD);

        let result = reduce(&config, &teams(), &ctx, &[]);

        assert_eq!(result.state, StatusValue::Failure);
        assert_eq!(result.description, DEFAULT_EXPLANATION);
    }

    #[test]
    fn test_unrecognized_gate_fails_closed() {
        let config = PolicyConfig::new().with_gate(GateCondition::new("title is 'x'", StatusValue::Failure, "bad"));

        let result = reduce(&config, &teams(), &context(), &[]);

        assert_eq!(result.state, StatusValue::Failure);
        assert_eq!(result.description, "bad");
    }

    #[test]
    fn test_duplicate_reviews_use_latest() {
        let config = PolicyConfig::new().with_group(GroupConfig::new("core", 1).with_team("backend"));
        let reviews = vec![
            Review::changes_requested("alice", "old"),
            Review::new("alice", ReviewState::Other, HEAD),
            Review::approved("alice", HEAD),
        ];

        let result = reduce(&config, &teams(), &context(), &reviews);

        assert_eq!(result.state, StatusValue::Success);
        assert_eq!(result.description, "core 1/1");
    }

    #[test]
    fn test_description_keeps_declaration_order() {
        let config = PolicyConfig::new()
            .with_group(GroupConfig::new("security", 1).with_user("dave"))
            .with_group(GroupConfig::new("core", 2).with_team("backend"))
            .with_group(GroupConfig::new("docs", 1).with_condition("'*.md' in files"));
        let reviews = vec![Review::approved("alice", HEAD), Review::changes_requested("dave", HEAD)];

        let result = reduce(&config, &teams(), &context(), &reviews);

        assert_eq!(result.state, StatusValue::Failure);
        assert_eq!(result.description, "security rejected, core 1/2");
    }

    #[test]
    fn test_labels_are_unioned_across_groups() {
        let config = PolicyConfig::new()
            .with_group(
                GroupConfig::new("core", 1)
                    .with_team("backend")
                    .with_label(GroupStatus::Approved, "approved")
                    .with_label(GroupStatus::Pending, "waiting"),
            )
            .with_group(
                GroupConfig::new("security", 1)
                    .with_user("dave")
                    .with_label(GroupStatus::Approved, "approved")
                    .with_label(GroupStatus::Pending, "waiting"),
            );

        let result = reduce(&config, &teams(), &context(), &[Review::approved("alice", HEAD)]);

        assert_eq!(result.state, StatusValue::Pending);
        assert_eq!(
            result.labels_to_add,
            BTreeSet::from(["approved".to_string(), "waiting".to_string()])
        );
        assert_eq!(
            result.labels_to_remove,
            BTreeSet::from(["approved".to_string(), "waiting".to_string()])
        );
    }

    #[test]
    fn test_apply_labels() {
        let result = EvaluationResult {
            state: StatusValue::Success,
            description: String::new(),
            labels_to_add: BTreeSet::from(["approved".to_string()]),
            labels_to_remove: BTreeSet::from(["pending".to_string(), "rejected".to_string()]),
            groups: Vec::new(),
        };
        let current = BTreeSet::from(["bug".to_string(), "pending".to_string()]);

        let labels = result.apply_labels(&current);

        assert_eq!(labels, BTreeSet::from(["approved".to_string(), "bug".to_string()]));
    }
}
