//! Domain layer for roundtable
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Discussion
//!
//! A fixed roster of expert roles talks about one topic in rounds. Every
//! contribution is a [`Turn`]; the append-only [`Transcript`] holds them all.
//!
//! ## Consensus
//!
//! After each round the [`ConsensusMetrics`] say how close the group is to
//! agreement. They come from an AI scorer when one answers sensibly and from
//! the lexical [`generate_rule_based_consensus`] heuristic otherwise.
//! [`is_consensus_reached`] is the single termination policy.
//!
//! ## Strategy
//!
//! Speaking orders are declared per phase in [`OrderingTables`] by role
//! identifier and resolved to roster indices once at startup.

pub mod config;
pub mod consensus;
pub mod core;
pub mod discussion;
pub mod prompt;
pub mod strategy;

// Re-export commonly used types
pub use consensus::{
    ConsensusMetrics, ConsensusTuning, DecisionEvolution, DiscussionPhase, EvaluationSource,
    PersonaPosition, RoundEvaluationResult, extract_next_round_focus, extract_persona_positions,
    generate_rule_based_consensus, is_consensus_reached, is_threshold_reached,
    parse_scorer_response, track_decision_evolution,
};
pub use config::OutputFormat;
pub use core::{
    error::{ConfigError, DomainError},
    model::Model,
    topic::Topic,
};
pub use discussion::{
    DiscussionRecord, DynamicRoundConfig, RoleId, RoleRoster, RoleSpec, TerminationReason,
    Transcript, Turn,
};
pub use prompt::PromptTemplate;
pub use strategy::{
    ContextPolicy, InsertionHint, ModeratorDecision, ModeratorPolicy, OrderingTables,
    ResolvedTables, TokenEstimate, estimate_token_usage, generate_next_round,
    generate_recommended_order, optimize_context, should_include_moderator, validate_order,
};
