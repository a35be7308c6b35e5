//! The finished discussion record

use crate::consensus::metrics::ConsensusMetrics;
use crate::core::topic::Topic;
use crate::discussion::config::DynamicRoundConfig;
use crate::discussion::role::RoleRoster;
use crate::discussion::turn::Turn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why the round loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The evaluator measured sufficient agreement
    Consensus,
    /// `max_rounds` ran out with dynamic evaluation disabled
    RoundLimit,
    /// `max_rounds` ran out and a forced final round closed the discussion
    ForcedFinalRound,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Consensus => "consensus",
            TerminationReason::RoundLimit => "round_limit",
            TerminationReason::ForcedFinalRound => "forced_final_round",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the round controller hands to downstream formatters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionRecord {
    pub topic: Topic,
    pub config: DynamicRoundConfig,
    pub roster: RoleRoster,
    pub rounds: Vec<Turn>,
    pub consensus_history: Vec<ConsensusMetrics>,
    pub current_round: u32,
    pub consensus_reached: bool,
    pub termination: TerminationReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DiscussionRecord {
    /// Metrics of the last evaluation, if any round was evaluated
    pub fn final_metrics(&self) -> Option<&ConsensusMetrics> {
        self.consensus_history.last()
    }

    /// Turns of one round in speaking order
    pub fn turns_in_round(&self, round: u32) -> impl Iterator<Item = &Turn> {
        self.rounds.iter().filter(move |t| t.round == round)
    }

    /// Distinct round numbers that have at least one turn, ascending
    pub fn round_numbers(&self) -> Vec<u32> {
        let mut rounds: Vec<u32> = self.rounds.iter().map(|t| t.round).collect();
        rounds.sort_unstable();
        rounds.dedup();
        rounds
    }

    pub fn was_forced(&self) -> bool {
        self.termination == TerminationReason::ForcedFinalRound
    }
}
