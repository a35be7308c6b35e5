//! Termination policy
//!
//! The one place that decides whether a round's metrics are good enough to
//! stop. Both the evaluator and the round strategy call
//! [`is_consensus_reached`].

use crate::consensus::metrics::ConsensusMetrics;
use crate::discussion::config::DynamicRoundConfig;

/// Whether the discussion may stop after `current_round`.
///
/// - `current_round >= max_rounds` → always true
/// - `current_round < min_rounds` → always false
/// - otherwise: score meets the threshold, no conflicting positions remain,
///   and the unresolved issue count is within tolerance
pub fn is_consensus_reached(
    metrics: &ConsensusMetrics,
    config: &DynamicRoundConfig,
    current_round: u32,
) -> bool {
    if current_round >= config.max_rounds {
        return true;
    }
    if current_round < config.min_rounds {
        return false;
    }

    u32::from(metrics.agreement_score) >= config.consensus_threshold
        && metrics.conflicting_positions.is_empty()
        && metrics.unresolved_issues.len() <= config.conflict_tolerance as usize
}

/// Reduced policy for the last-resort evaluation: round bounds and score
/// threshold only, conflicts and issues ignored.
pub fn is_threshold_reached(
    metrics: &ConsensusMetrics,
    config: &DynamicRoundConfig,
    current_round: u32,
) -> bool {
    if current_round >= config.max_rounds {
        return true;
    }
    if current_round < config.min_rounds {
        return false;
    }
    u32::from(metrics.agreement_score) >= config.consensus_threshold
}
