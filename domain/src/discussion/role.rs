//! Role registry
//!
//! Participants are identified by a stable [`RoleId`]. A [`RoleRoster`] fixes
//! the order of roles, and a role's position in the roster is the participant
//! index that speaking orders are expressed in.

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Most speaking slots a roster may hold (five experts plus a moderator)
pub const MAX_ROSTER_SIZE: usize = 6;

/// Stable identifier of a participant role (e.g. `"architect"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        RoleId::new(s)
    }
}

impl From<String> for RoleId {
    fn from(s: String) -> Self {
        RoleId(s)
    }
}

/// A simulated expert taking part in the discussion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub id: RoleId,
    /// Name shown in the transcript
    pub display_name: String,
    /// One-line description of the expertise the role speaks from
    pub expertise: String,
    /// Mediates conflict; only speaks when escalated to
    #[serde(default)]
    pub is_moderator: bool,
    /// Speaks first in the forced final round
    #[serde(default)]
    pub is_decision_maker: bool,
}

impl RoleSpec {
    pub fn new(
        id: impl Into<RoleId>,
        display_name: impl Into<String>,
        expertise: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            expertise: expertise.into(),
            is_moderator: false,
            is_decision_maker: false,
        }
    }

    pub fn moderator(mut self) -> Self {
        self.is_moderator = true;
        self
    }

    pub fn decision_maker(mut self) -> Self {
        self.is_decision_maker = true;
        self
    }
}

/// Ordered registry of participant roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleRoster {
    roles: Vec<RoleSpec>,
}

impl RoleRoster {
    /// Build a roster, checking identifiers are unique and exactly one
    /// moderator and one decision maker are present.
    pub fn new(roles: Vec<RoleSpec>) -> Result<Self, ConfigError> {
        if roles.len() > MAX_ROSTER_SIZE {
            return Err(ConfigError::RosterTooLarge(roles.len()));
        }
        for (i, role) in roles.iter().enumerate() {
            if roles[..i].iter().any(|r| r.id == role.id) {
                return Err(ConfigError::DuplicateRole(role.id.to_string()));
            }
        }

        let moderators = roles.iter().filter(|r| r.is_moderator).count();
        if moderators != 1 {
            return Err(ConfigError::RoleCount {
                kind: "moderator",
                found: moderators,
            });
        }
        let deciders = roles
            .iter()
            .filter(|r| r.is_decision_maker && !r.is_moderator)
            .count();
        if deciders != 1 {
            return Err(ConfigError::RoleCount {
                kind: "decision maker",
                found: deciders,
            });
        }

        Ok(Self { roles })
    }

    pub fn roles(&self) -> &[RoleSpec] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RoleSpec> {
        self.roles.get(index)
    }

    pub fn index_of(&self, id: &RoleId) -> Option<usize> {
        self.roles.iter().position(|r| &r.id == id)
    }

    pub fn moderator_index(&self) -> usize {
        // `new` guarantees exactly one moderator
        self.roles.iter().position(|r| r.is_moderator).unwrap_or(0)
    }

    pub fn decision_maker_index(&self) -> usize {
        self.roles
            .iter()
            .position(|r| r.is_decision_maker && !r.is_moderator)
            .unwrap_or(0)
    }

    /// Indices of every role except the moderator, in roster order
    pub fn expert_indices(&self) -> Vec<usize> {
        self.roles
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_moderator)
            .map(|(i, _)| i)
            .collect()
    }
}

impl Default for RoleRoster {
    /// Architect, developer, security, QA, product manager and moderator,
    /// at indices 0 through 5.
    fn default() -> Self {
        Self {
            roles: vec![
                RoleSpec::new(
                    "architect",
                    "Architect",
                    "system architecture, component boundaries and long-term maintainability",
                ),
                RoleSpec::new(
                    "developer",
                    "Senior Developer",
                    "implementation effort, code quality, integration and performance",
                ),
                RoleSpec::new(
                    "security",
                    "Security Expert",
                    "threat modelling, authentication, data protection and compliance",
                ),
                RoleSpec::new(
                    "qa",
                    "QA Engineer",
                    "test strategy, reliability and failure modes",
                ),
                RoleSpec::new(
                    "product",
                    "Product Manager",
                    "user needs, scope, priorities and business impact",
                )
                .decision_maker(),
                RoleSpec::new(
                    "moderator",
                    "Moderator",
                    "mediating disagreements and steering the group toward a decision",
                )
                .moderator(),
            ],
        }
    }
}
