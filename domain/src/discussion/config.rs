//! Dynamic round configuration

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Thresholds governing when a discussion may stop.
///
/// Set once when the discussion starts and read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicRoundConfig {
    /// Evaluate consensus after each round. When disabled the discussion
    /// always runs `max_rounds` rounds.
    pub enabled: bool,
    /// No early termination before this round
    pub min_rounds: u32,
    /// Hard round limit (the forced final round comes after it)
    pub max_rounds: u32,
    /// Agreement score required for consensus (0-100)
    pub consensus_threshold: u32,
    /// Unresolved issues tolerated at consensus
    pub conflict_tolerance: u32,
    /// Whether the moderator role may be escalated to
    pub moderator_enabled: bool,
}

impl Default for DynamicRoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_rounds: 3,
            max_rounds: 6,
            consensus_threshold: 75,
            conflict_tolerance: 2,
            moderator_enabled: true,
        }
    }
}

impl DynamicRoundConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_rounds == 0 {
            return Err(ConfigError::ZeroMinRounds);
        }
        if self.min_rounds > self.max_rounds {
            return Err(ConfigError::RoundRange {
                min: self.min_rounds,
                max: self.max_rounds,
            });
        }
        if self.consensus_threshold > 100 {
            return Err(ConfigError::ThresholdOutOfRange(self.consensus_threshold));
        }
        Ok(())
    }

    pub fn with_rounds(mut self, min_rounds: u32, max_rounds: u32) -> Self {
        self.min_rounds = min_rounds;
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_threshold(mut self, consensus_threshold: u32) -> Self {
        self.consensus_threshold = consensus_threshold;
        self
    }

    pub fn with_tolerance(mut self, conflict_tolerance: u32) -> Self {
        self.conflict_tolerance = conflict_tolerance;
        self
    }

    pub fn without_moderator(mut self) -> Self {
        self.moderator_enabled = false;
        self
    }

    /// Fixed-length discussion: always run `max_rounds`
    pub fn static_rounds(mut self) -> Self {
        self.enabled = false;
        self
    }
}
