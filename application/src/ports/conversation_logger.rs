//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording discussion events
//! (turns, failed turns, round evaluations, the forced final round) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! discussion transcript in a machine-readable format (JSONL).

use roundtable_domain::{
    DiscussionRecord, DynamicRoundConfig, Model, RoleRoster, RoleSpec, RoundEvaluationResult,
    Topic, Turn,
};
use serde_json::{Value, json};

/// A structured conversation event for logging.
///
/// Each event has a type string and a JSON payload containing event-specific
/// fields. The adapter adds the timestamp when it writes the record.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "turn", "round_evaluated").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    pub fn discussion_started(
        topic: &Topic,
        config: &DynamicRoundConfig,
        roster: &RoleRoster,
    ) -> Self {
        Self::new(
            "discussion_started",
            json!({
                "topic": topic.content(),
                "config": config,
                "roster": roster,
            }),
        )
    }

    /// A contribution that made it into the transcript
    pub fn turn(turn: &Turn) -> Self {
        Self::new("turn", json!(turn))
    }

    pub fn turn_failed(round: u32, role: &RoleSpec, error: &str) -> Self {
        Self::new(
            "turn_failed",
            json!({
                "round": round,
                "role": role.id.as_str(),
                "error": error,
            }),
        )
    }

    /// Prompt size only; the prompt text itself is rebuilt from the transcript
    pub fn participant_prompt(round: u32, role: &RoleSpec, model: &Model, bytes: usize) -> Self {
        Self::new(
            "participant_prompt",
            json!({
                "round": round,
                "role": role.id.as_str(),
                "model": model.to_string(),
                "bytes": bytes,
            }),
        )
    }

    pub fn scorer_response(round: u32, model: &Model, text: &str) -> Self {
        Self::new(
            "scorer_response",
            json!({
                "round": round,
                "model": model.to_string(),
                "bytes": text.len(),
                "text": text,
            }),
        )
    }

    pub fn round_evaluated(round: u32, result: &RoundEvaluationResult) -> Self {
        Self::new(
            "round_evaluated",
            json!({
                "round": round,
                "source": result.source.as_str(),
                "metrics": result.metrics,
                "should_terminate": result.should_terminate,
                "next_round_focus": result.next_round_focus,
            }),
        )
    }

    pub fn forced_final_round(round: u32, order: &[usize], directive: &str) -> Self {
        Self::new(
            "forced_final_round",
            json!({ "round": round, "order": order, "directive": directive }),
        )
    }

    pub fn discussion_finished(record: &DiscussionRecord) -> Self {
        Self::new(
            "discussion_finished",
            json!({
                "termination": record.termination.as_str(),
                "current_round": record.current_round,
                "consensus_reached": record.consensus_reached,
                "turns": record.rounds.len(),
            }),
        )
    }
}

/// Port for logging conversation events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// The `log` method is synchronous and non-fallible; logging failures are
/// ignored by the adapter.
pub trait ConversationLogger: Send + Sync {
    /// Record a conversation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
