use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::access::ScopeError;

/// Privilege rank. 1 is a general member; higher is broader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleScore(pub u8);

impl RoleScore {
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for RoleScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    pub name: String,
    pub score: u8,
}

#[derive(Debug, Deserialize)]
struct RoleFile {
    roles: Vec<RoleEntry>,
}

const BUILTIN_ROLES: &[(&str, u8)] = &[
    ("User", 1),
    ("Usher", 1),
    ("General Coordinator", 2),
    ("Associate Coordinator", 2),
    ("Group Coordinator", 3),
    ("Group Admin", 3),
    ("Regional Coordinator", 4),
    ("Regional Admin", 4),
    ("State Overseer", 5),
    ("State Admin", 5),
    ("National Admin", 6),
    ("National Overseer", 6),
    ("General Superintendent", 7),
    ("Super Admin", 8),
];

/// Role name -> score lookup. Read-only once built.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    // keyed by normalized name, value keeps the display name
    roles: BTreeMap<String, (String, RoleScore)>,
}

impl RoleRegistry {
    pub fn builtin() -> Self {
        let entries = BUILTIN_ROLES.iter().map(|(name, score)| RoleEntry {
            name: (*name).to_string(),
            score: *score,
        });
        // builtin table is known-good
        Self::from_entries(entries).unwrap_or_else(|_| Self { roles: BTreeMap::new() })
    }

    pub fn from_entries<I>(entries: I) -> Result<Self, ScopeError>
    where
        I: IntoIterator<Item = RoleEntry>,
    {
        let mut roles = BTreeMap::new();
        for entry in entries {
            let key = Self::normalize(&entry.name);
            if key.is_empty() {
                return Err(ScopeError::InvalidRoleTable("empty role name".into()));
            }
            if entry.score == 0 {
                return Err(ScopeError::InvalidRoleTable(format!(
                    "role '{}' has score 0, scores start at 1",
                    entry.name
                )));
            }
            if let Some((_, existing)) = roles.get(&key) {
                if *existing != RoleScore(entry.score) {
                    return Err(ScopeError::InvalidRoleTable(format!(
                        "role '{}' listed with scores {} and {}",
                        entry.name, existing, entry.score
                    )));
                }
                continue;
            }
            roles.insert(key, (entry.name.trim().to_string(), RoleScore(entry.score)));
        }
        if roles.is_empty() {
            return Err(ScopeError::InvalidRoleTable("no roles defined".into()));
        }
        Ok(Self { roles })
    }

    /// Parse a `roles: [{name, score}]` YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ScopeError> {
        let file: RoleFile = serde_yaml::from_str(yaml)
            .map_err(|e| ScopeError::InvalidRoleTable(e.to_string()))?;
        Self::from_entries(file.roles)
    }

    /// Unknown names are `NotFound`; there is no default score.
    pub fn score_for(&self, role_name: &str) -> Result<RoleScore, ScopeError> {
        self.roles
            .get(&Self::normalize(role_name))
            .map(|(_, score)| *score)
            .ok_or_else(|| ScopeError::NotFound(format!("role '{}'", role_name)))
    }

    pub fn contains(&self, role_name: &str) -> bool {
        self.roles.contains_key(&Self::normalize(role_name))
    }

    /// Entries ordered by score, then name.
    pub fn entries(&self) -> Vec<RoleEntry> {
        let mut out: Vec<RoleEntry> = self
            .roles
            .values()
            .map(|(name, score)| RoleEntry {
                name: name.clone(),
                score: score.value(),
            })
            .collect();
        out.sort_by(|a, b| a.score.cmp(&b.score).then_with(|| a.name.cmp(&b.name)));
        out
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scores_and_aliases() {
        let registry = RoleRegistry::builtin();
        assert_eq!(registry.score_for("User").unwrap(), RoleScore(1));
        assert_eq!(registry.score_for("Usher").unwrap(), RoleScore(1));
        assert_eq!(registry.score_for("Group Admin").unwrap(), RoleScore(3));
        assert_eq!(registry.score_for("State Admin").unwrap(), RoleScore(5));
        assert_eq!(registry.score_for("General Superintendent").unwrap(), RoleScore(7));
        assert_eq!(registry.score_for("  regional coordinator ").unwrap(), RoleScore(4));
    }

    #[test]
    fn unknown_role_is_not_found() {
        let registry = RoleRegistry::builtin();
        let err = registry.score_for("Janitor").unwrap_err();
        assert!(matches!(err, ScopeError::NotFound(_)));
        assert!(!registry.contains(""));
    }

    #[test]
    fn loads_yaml_and_rejects_conflicts() {
        let registry = RoleRegistry::from_yaml_str(
            "roles:\n  - { name: Member, score: 1 }\n  - { name: Pastor, score: 4 }\n",
        )
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.score_for("pastor").unwrap(), RoleScore(4));

        let err = RoleRegistry::from_yaml_str(
            "roles:\n  - { name: Member, score: 1 }\n  - { name: member, score: 2 }\n",
        )
        .unwrap_err();
        assert!(matches!(err, ScopeError::InvalidRoleTable(_)));

        assert!(RoleRegistry::from_yaml_str("roles:\n  - { name: Zero, score: 0 }\n").is_err());
    }

    #[test]
    fn entries_are_sorted_by_score() {
        let entries = RoleRegistry::builtin().entries();
        assert_eq!(entries.first().unwrap().score, 1);
        assert_eq!(entries.last().unwrap().name, "Super Admin");
    }
}
