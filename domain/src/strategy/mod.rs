//! Round strategy: speaking orders, moderator policy and context policy.

pub mod context;
pub mod moderator;
pub mod ordering;
pub mod tables;

pub use context::{
    ContextPolicy, PartitionedTranscript, TokenEstimate, estimate_token_usage, optimize_context,
    partition_transcript,
};
pub use moderator::{InsertionHint, ModeratorDecision, ModeratorPolicy, should_include_moderator};
pub use ordering::{
    avoid_repetition, generate_next_round, generate_recommended_order, optimize_order_for_issues,
};
pub use tables::{IssueCategory, OrderingTables, PhaseOrders, ResolvedTables, validate_order};
