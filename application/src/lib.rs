//! Application layer for roundtable
//!
//! This crate contains use cases and port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway, LlmSession},
    participant::{ParticipantPort, TurnContext},
    progress::{DiscussionProgressNotifier, NoProgress},
};
pub use use_cases::evaluate_round::{ConsensusEvaluator, EvaluationError, RoundEvaluator};
pub use use_cases::participant_turns::GatewayParticipant;
pub use use_cases::round_strategy::RoundStrategy;
pub use use_cases::run_discussion::{
    ControllerState, RunDiscussionError, RunDiscussionInput, RunDiscussionUseCase,
};
