//! Consensus scoring: metrics, the rule-based heuristic, scorer-reply
//! parsing and the single termination policy.

pub mod focus;
pub mod metrics;
pub mod parsing;
pub mod policy;
pub mod positions;
pub mod rule_based;
pub mod tuning;

pub use focus::{extract_next_round_focus, phase_focus};
pub use metrics::{
    ConsensusMetrics, DecisionEvolution, DiscussionPhase, EvaluationSource, PersonaPosition,
    RoundEvaluationResult,
};
pub use parsing::parse_scorer_response;
pub use policy::{is_consensus_reached, is_threshold_reached};
pub use positions::{extract_persona_positions, track_decision_evolution};
pub use rule_based::{derive_phase, detect_conflicts, generate_rule_based_consensus};
pub use tuning::ConsensusTuning;
