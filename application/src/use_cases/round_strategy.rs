//! Round Strategy use case
//!
//! Decides who speaks next and in which order. Holds the ordering tables
//! resolved against the discussion's roster.

use roundtable_domain::{
    ConsensusMetrics, ContextPolicy, DynamicRoundConfig, ModeratorDecision, ModeratorPolicy,
    ResolvedTables, TokenEstimate, Turn, estimate_token_usage, generate_next_round,
    is_consensus_reached, optimize_context, should_include_moderator, validate_order,
};
use tracing::{debug, warn};

pub struct RoundStrategy {
    tables: ResolvedTables,
    moderator_policy: ModeratorPolicy,
}

impl RoundStrategy {
    pub fn new(tables: ResolvedTables) -> Self {
        Self {
            tables,
            moderator_policy: ModeratorPolicy::default(),
        }
    }

    pub fn with_moderator_policy(mut self, policy: ModeratorPolicy) -> Self {
        self.moderator_policy = policy;
        self
    }

    pub fn tables(&self) -> &ResolvedTables {
        &self.tables
    }

    /// Speaking order for `current_round`.
    ///
    /// An order that fails validation is replaced by the phase's base order
    /// so the round still runs.
    pub fn generate_next_round(
        &self,
        current_round: u32,
        metrics: &ConsensusMetrics,
        config: &DynamicRoundConfig,
        previous_orders: &[Vec<usize>],
    ) -> Vec<usize> {
        let order = generate_next_round(
            current_round,
            metrics,
            config,
            previous_orders,
            &self.tables,
            &self.moderator_policy,
        );

        if self.validate_order(&order) {
            debug!("Round {} order: {:?}", current_round, order);
            order
        } else {
            let base = self.tables.base_order(metrics.discussion_phase).to_vec();
            warn!(
                "Round {} order {:?} is invalid, using base order {:?}",
                current_round, order, base
            );
            base
        }
    }

    /// Decision-maker-first order of the forced final round
    pub fn final_round_order(&self, config: &DynamicRoundConfig) -> Vec<usize> {
        self.tables.final_order(config.moderator_enabled).to_vec()
    }

    pub fn should_include_moderator(
        &self,
        metrics: &ConsensusMetrics,
        config: &DynamicRoundConfig,
        round: u32,
    ) -> ModeratorDecision {
        should_include_moderator(metrics, config, round, &self.moderator_policy)
    }

    pub fn should_terminate_discussion(
        &self,
        metrics: &ConsensusMetrics,
        config: &DynamicRoundConfig,
        current_round: u32,
    ) -> bool {
        is_consensus_reached(metrics, config, current_round)
    }

    pub fn optimize_context(&self, current_round: u32) -> ContextPolicy {
        optimize_context(current_round)
    }

    pub fn estimate_token_usage(
        &self,
        turns: &[Turn],
        upcoming_speakers: usize,
        next_round: u32,
    ) -> TokenEstimate {
        estimate_token_usage(turns, upcoming_speakers, optimize_context(next_round))
    }

    pub fn validate_order(&self, order: &[usize]) -> bool {
        validate_order(order, self.tables.roster_size)
    }
}
