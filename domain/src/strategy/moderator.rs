//! Moderator inclusion policy

use crate::consensus::metrics::ConsensusMetrics;
use crate::discussion::config::DynamicRoundConfig;
use serde::{Deserialize, Serialize};

/// Where the moderator goes in a speaking order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertionHint {
    Front,
    Middle,
    End,
}

impl InsertionHint {
    /// Slot for the moderator in an order of `len` other speakers
    pub fn slot(&self, len: usize) -> usize {
        match self {
            InsertionHint::Front => 0,
            InsertionHint::Middle => len / 2,
            InsertionHint::End => len,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeratorDecision {
    pub include: bool,
    pub insertion: InsertionHint,
}

/// Thresholds of [`should_include_moderator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeratorPolicy {
    /// Re-check with the moderator every this many rounds
    pub periodic_interval: u32,
    /// A score this close to the threshold counts as borderline
    pub borderline_margin: u32,
    /// More conflicts than this put the moderator first
    pub front_conflicts: usize,
    /// Below this score the moderator speaks mid-round
    pub middle_score: u8,
}

impl Default for ModeratorPolicy {
    fn default() -> Self {
        Self {
            periodic_interval: 3,
            borderline_margin: 10,
            front_conflicts: 2,
            middle_score: 60,
        }
    }
}

/// Decide whether the moderator speaks in `round` and where.
///
/// Included when conflicts exist, on every `periodic_interval`-th round, or
/// when the score is within `borderline_margin` of the threshold. Never
/// included with the moderator disabled.
pub fn should_include_moderator(
    metrics: &ConsensusMetrics,
    config: &DynamicRoundConfig,
    round: u32,
    policy: &ModeratorPolicy,
) -> ModeratorDecision {
    let insertion = if metrics.conflict_count() > policy.front_conflicts {
        InsertionHint::Front
    } else if metrics.agreement_score < policy.middle_score {
        InsertionHint::Middle
    } else {
        InsertionHint::End
    };

    if !config.moderator_enabled {
        return ModeratorDecision {
            include: false,
            insertion,
        };
    }

    let periodic = policy.periodic_interval > 0 && round % policy.periodic_interval == 0;
    let borderline = u32::from(metrics.agreement_score).abs_diff(config.consensus_threshold)
        <= policy.borderline_margin;

    ModeratorDecision {
        include: metrics.has_conflicts() || periodic || borderline,
        insertion,
    }
}
