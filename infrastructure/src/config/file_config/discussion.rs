//! Discussion configuration from TOML (`[discussion]` section)

use roundtable_domain::DynamicRoundConfig;
use serde::{Deserialize, Serialize};

/// Raw round-control settings
///
/// Field names and defaults match [`DynamicRoundConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    /// Evaluate consensus after every round
    pub enabled: bool,
    pub min_rounds: u32,
    pub max_rounds: u32,
    /// Agreement score (0-100) needed to stop early
    pub consensus_threshold: u32,
    /// Unresolved issues tolerated at consensus
    pub conflict_tolerance: u32,
    pub moderator_enabled: bool,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        let defaults = DynamicRoundConfig::default();
        Self {
            enabled: defaults.enabled,
            min_rounds: defaults.min_rounds,
            max_rounds: defaults.max_rounds,
            consensus_threshold: defaults.consensus_threshold,
            conflict_tolerance: defaults.conflict_tolerance,
            moderator_enabled: defaults.moderator_enabled,
        }
    }
}

impl FileDiscussionConfig {
    /// Convert to the domain configuration. Range checks happen in
    /// [`FileConfig::validate`](super::FileConfig::validate).
    pub fn to_round_config(&self) -> DynamicRoundConfig {
        DynamicRoundConfig {
            enabled: self.enabled,
            min_rounds: self.min_rounds,
            max_rounds: self.max_rounds,
            consensus_threshold: self.consensus_threshold,
            conflict_tolerance: self.conflict_tolerance,
            moderator_enabled: self.moderator_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain() {
        assert_eq!(
            FileDiscussionConfig::default().to_round_config(),
            DynamicRoundConfig::default()
        );
    }

    #[test]
    fn test_partial_section() {
        let toml_str = r#"
[discussion]
max_rounds = 8
moderator_enabled = false
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let rounds = config.discussion.to_round_config();
        assert_eq!(rounds.max_rounds, 8);
        assert_eq!(rounds.min_rounds, 3);
        assert!(!rounds.moderator_enabled);
    }
}
