//! Organization teams and the login → teams index.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// A team from the organization roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    pub name: String,
    #[serde(default)]
    pub members: BTreeSet<String>,
}

impl Team {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

/// Maps a login to the names of every team it belongs to.
#[derive(Debug, Clone, Default)]
pub struct TeamIndex {
    by_login: HashMap<String, HashSet<String>>,
}

impl TeamIndex {
    /// Build the index from a flat roster.
    pub fn new(teams: &[Team]) -> Self {
        let mut by_login: HashMap<String, HashSet<String>> = HashMap::new();
        for team in teams {
            for member in &team.members {
                by_login
                    .entry(member.clone())
                    .or_default()
                    .insert(team.name.clone());
            }
        }
        Self { by_login }
    }

    /// Teams the login belongs to; empty for unknown logins.
    pub fn teams_of(&self, login: &str) -> HashSet<&str> {
        self.by_login
            .get(login)
            .map(|teams| teams.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether the login belongs to any of the given teams.
    pub fn is_member_of_any<'a, I>(&self, login: &str, teams: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        match self.by_login.get(login) {
            Some(own) => teams.into_iter().any(|team| own.contains(team)),
            None => false,
        }
    }
}

impl From<&[Team]> for TeamIndex {
    fn from(teams: &[Team]) -> Self {
        Self::new(teams)
    }
}
