//! Declarative approval policy (`.pullapprove.yml`).
//!
//! ```yaml
//! version: 3
//! overrides:
//!   - if: "'hotfix' not in labels"
//!     status: success
//!     explanation: "Hotfixes skip review"
//! pullapprove_conditions:
//!   - condition: "'WIP' not in title"
//!     unmet_status: pending
//!     explanation: "Work in progress"
//! groups:
//!   core:
//!     conditions: ["'*.rs' in files"]
//!     reviews:
//!       required: 2
//!     reviewers:
//!       teams: [backend]
//!     labels:
//!       approved: core-approved
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::condition::Condition;
use crate::error::{CoreError, CoreResult};

/// Name of the policy file looked up in the repository.
pub const CONFIG_FILE_NAME: &str = ".pullapprove.yml";

/// Explanation used when a rule does not provide one.
pub const DEFAULT_EXPLANATION: &str = "Pr conditions not met!";

/// Commit status reported for a pull request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusValue {
    Pending,
    Success,
    Error,
    #[default]
    Failure,
}

impl StatusValue {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusValue::Pending => "pending",
            StatusValue::Success => "success",
            StatusValue::Error => "error",
            StatusValue::Failure => "failure",
        }
    }
}

impl std::fmt::Display for StatusValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a single reviewer group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    Approved,
    Pending,
    Rejected,
}

impl GroupStatus {
    pub const ALL: [GroupStatus; 3] = [GroupStatus::Approved, GroupStatus::Pending, GroupStatus::Rejected];
}

/// Top-priority negative gate: fires when its condition is NOT met.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverrideRule {
    #[serde(rename = "if", default, deserialize_with = "blank_as_none")]
    pub condition: Option<Condition>,
    #[serde(rename = "status", default, deserialize_with = "blank_as_default_status")]
    pub resulting_state: StatusValue,
    #[serde(default = "default_explanation", deserialize_with = "blank_as_default_explanation")]
    pub explanation: String,
}

/// Global negative gate evaluated after overrides and before groups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateCondition {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub condition: Option<Condition>,
    #[serde(rename = "unmet_status", default, deserialize_with = "blank_as_default_status")]
    pub unmet_state: StatusValue,
    #[serde(default = "default_explanation", deserialize_with = "blank_as_default_explanation")]
    pub explanation: String,
}

impl OverrideRule {
    pub fn new(condition: impl Into<Condition>, resulting_state: StatusValue, explanation: impl Into<String>) -> Self {
        Self {
            condition: Some(condition.into()),
            resulting_state,
            explanation: explanation.into(),
        }
    }
}

impl GateCondition {
    pub fn new(condition: impl Into<Condition>, unmet_state: StatusValue, explanation: impl Into<String>) -> Self {
        Self {
            condition: Some(condition.into()),
            unmet_state,
            explanation: explanation.into(),
        }
    }
}

fn default_explanation() -> String {
    DEFAULT_EXPLANATION.to_string()
}

/// Null, empty and whitespace-only values read as absent.
fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<Condition>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_blank(deserializer)?.map(Condition::parse))
}

fn blank_as_default_explanation<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_blank(deserializer)?.unwrap_or_else(default_explanation))
}

fn blank_as_default_status<'de, D>(deserializer: D) -> Result<StatusValue, D::Error>
where
    D: Deserializer<'de>,
{
    match non_blank(deserializer)? {
        None => Ok(StatusValue::default()),
        Some(value) => match value.trim() {
            "pending" => Ok(StatusValue::Pending),
            "success" => Ok(StatusValue::Success),
            "error" => Ok(StatusValue::Error),
            "failure" => Ok(StatusValue::Failure),
            other => Err(D::Error::unknown_variant(other, &["pending", "success", "error", "failure"])),
        },
    }
}

/// Labels applied for each group status.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupLabels {
    #[serde(default)]
    pub approved: Option<String>,
    #[serde(default)]
    pub pending: Option<String>,
    #[serde(default)]
    pub rejected: Option<String>,
}

impl GroupLabels {
    pub fn for_status(&self, status: GroupStatus) -> Option<&str> {
        match status {
            GroupStatus::Approved => self.approved.as_deref(),
            GroupStatus::Pending => self.pending.as_deref(),
            GroupStatus::Rejected => self.rejected.as_deref(),
        }
    }
}

/// A named reviewer group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupConfig {
    pub name: String,
    /// Group type as written; evaluation treats every group as required
    pub kind: String,
    /// `None` means the group is always active
    pub conditions: Option<Vec<Condition>>,
    pub required_approvals: u32,
    pub reviewer_teams: BTreeSet<String>,
    pub reviewer_users: BTreeSet<String>,
    pub labels: GroupLabels,
}

impl GroupConfig {
    pub fn new(name: impl Into<String>, required_approvals: u32) -> Self {
        Self {
            name: name.into(),
            kind: default_group_type(),
            conditions: None,
            required_approvals,
            reviewer_teams: BTreeSet::new(),
            reviewer_users: BTreeSet::new(),
            labels: GroupLabels::default(),
        }
    }

    pub fn with_condition(mut self, condition: impl Into<Condition>) -> Self {
        self.conditions.get_or_insert_with(Vec::new).push(condition.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.reviewer_teams.insert(team.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.reviewer_users.insert(user.into());
        self
    }

    pub fn with_label(mut self, status: GroupStatus, label: impl Into<String>) -> Self {
        let label = Some(label.into());
        match status {
            GroupStatus::Approved => self.labels.approved = label,
            GroupStatus::Pending => self.labels.pending = label,
            GroupStatus::Rejected => self.labels.rejected = label,
        }
        self
    }

    fn from_raw(name: String, raw: RawGroup) -> Self {
        Self {
            name,
            kind: raw.kind,
            conditions: raw.conditions,
            required_approvals: raw.reviews.required,
            reviewer_teams: raw.reviewers.teams,
            reviewer_users: raw.reviewers.users,
            labels: raw.labels,
        }
    }
}

/// Group as it appears under `groups.<name>`.
#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(rename = "type", default = "default_group_type")]
    kind: String,
    #[serde(default)]
    conditions: Option<Vec<Condition>>,
    reviews: RawReviews,
    #[serde(default)]
    reviewers: RawReviewers,
    #[serde(default)]
    labels: GroupLabels,
}

#[derive(Debug, Deserialize)]
struct RawReviews {
    required: u32,
}

#[derive(Debug, Default, Deserialize)]
struct RawReviewers {
    #[serde(default)]
    teams: BTreeSet<String>,
    #[serde(default)]
    users: BTreeSet<String>,
}

fn default_group_type() -> String {
    "required".to_string()
}

/// Top-level document before group validation.
#[derive(Debug, Default, Deserialize)]
struct RawPolicy {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    pullapprove_conditions: Option<Vec<GateCondition>>,
    #[serde(default)]
    overrides: Option<Vec<OverrideRule>>,
    #[serde(default)]
    groups: Option<Value>,
}

/// A complete approval policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyConfig {
    pub version: Option<u32>,
    pub overrides: Vec<OverrideRule>,
    pub conditions: Vec<GateCondition>,
    /// Groups in declaration order
    pub groups: Vec<GroupConfig>,
}

impl PolicyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, rule: OverrideRule) -> Self {
        self.overrides.push(rule);
        self
    }

    pub fn with_gate(mut self, gate: GateCondition) -> Self {
        self.conditions.push(gate);
        self
    }

    pub fn with_group(mut self, group: GroupConfig) -> Self {
        self.groups.push(group);
        self
    }

    pub fn group(&self, name: &str) -> Option<&GroupConfig> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Every condition string that matches no grammar form.
    pub fn unrecognized_conditions(&self) -> Vec<&Condition> {
        let rules = self.overrides.iter().filter_map(|o| o.condition.as_ref());
        let gates = self.conditions.iter().filter_map(|g| g.condition.as_ref());
        let groups = self
            .groups
            .iter()
            .filter_map(|g| g.conditions.as_ref())
            .flatten();

        rules
            .chain(gates)
            .chain(groups)
            .filter(|c| !c.is_recognized())
            .collect()
    }

    /// Load a policy from a YAML file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigMissing(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a policy from a YAML string. An empty document is an empty policy.
    pub fn from_yaml(yaml: &str) -> CoreResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: Option<RawPolicy> = serde_yaml::from_str(yaml)?;
        let raw = raw.unwrap_or_default();

        Ok(Self {
            version: raw.version,
            overrides: raw.overrides.unwrap_or_default(),
            conditions: raw.pullapprove_conditions.unwrap_or_default(),
            groups: parse_groups(raw.groups)?,
        })
    }
}

fn parse_groups(groups: Option<Value>) -> CoreResult<Vec<GroupConfig>> {
    let mapping = match groups {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Mapping(mapping)) => mapping,
        Some(_) => {
            return Err(CoreError::InvalidStructure("`groups` must be a mapping of group name to group".into()))
        }
    };

    let mut parsed = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = match key {
            Value::String(name) => name,
            other => {
                return Err(CoreError::InvalidStructure(format!(
                    "group names must be strings, found {:?}",
                    other
                )))
            }
        };
        let raw: RawGroup = serde_yaml::from_value(value).map_err(|e| CoreError::InvalidGroup {
            group: name.clone(),
            message: e.to_string(),
        })?;
        parsed.push(GroupConfig::from_raw(name, raw));
    }

    Ok(parsed)
}
