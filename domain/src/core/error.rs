//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Discussion topic cannot be empty")]
    EmptyTopic,

    #[error("Roster has no participants")]
    EmptyRoster,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Invalid speaking order: {0:?}")]
    InvalidOrder(Vec<usize>),
}

/// Errors detected while validating discussion configuration or ordering tables.
///
/// These are raised once, when a discussion is set up. Nothing inside the
/// round loop produces them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("min_rounds must be at least 1")]
    ZeroMinRounds,

    #[error("min_rounds ({min}) exceeds max_rounds ({max})")]
    RoundRange { min: u32, max: u32 },

    #[error("consensus_threshold must be within 0..=100, got {0}")]
    ThresholdOutOfRange(u32),

    #[error("unknown role '{0}' referenced by ordering tables")]
    UnknownRole(String),

    #[error("duplicate role '{0}' in roster")]
    DuplicateRole(String),

    #[error("base order for phase '{phase}' is not a permutation of the non-moderator roles")]
    NotAPermutation { phase: String },

    #[error("roster must contain exactly one {kind}, found {found}")]
    RoleCount { kind: &'static str, found: usize },

    #[error("roster has {0} participants, at most 6 speaking slots are supported")]
    RosterTooLarge(usize),

    #[error("at least 3 non-moderator roles are needed to form a speaking order, found {0}")]
    TooFewSpeakers(usize),

    #[error("issue category '{0}' has no keywords")]
    EmptyCategory(String),
}

impl DomainError {
    /// Whether this error came from configuration validation
    pub fn is_config(&self) -> bool {
        matches!(self, DomainError::InvalidConfig(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_range_display() {
        let error = ConfigError::RoundRange { min: 5, max: 3 };
        assert_eq!(error.to_string(), "min_rounds (5) exceeds max_rounds (3)");
    }

    #[test]
    fn test_is_config_check() {
        assert!(DomainError::from(ConfigError::ZeroMinRounds).is_config());
        assert!(!DomainError::EmptyTopic.is_config());
        assert!(!DomainError::InvalidOrder(vec![1, 1]).is_config());
    }
}
