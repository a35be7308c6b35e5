//! Participant port
//!
//! Produces one participant's contribution for a round. The round controller
//! only ever talks to participants through this trait.

use crate::ports::llm_gateway::GatewayError;
use async_trait::async_trait;
use roundtable_domain::{ContextPolicy, RoleSpec, Topic, Transcript};

/// Everything a participant sees when asked for a turn
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub topic: &'a Topic,
    /// Round the turn belongs to
    pub round: u32,
    /// Every turn so far, including earlier turns of this round
    pub transcript: &'a Transcript,
    pub focus: &'a [String],
    /// Extra instruction, set only in the forced final round
    pub directive: Option<&'a str>,
    /// Advisory: how much of the transcript to render
    pub context_policy: ContextPolicy,
}

#[async_trait]
pub trait ParticipantPort: Send + Sync {
    /// Generate `role`'s turn. A failure skips the turn; it never ends the
    /// discussion.
    async fn generate_turn(
        &self,
        role: &RoleSpec,
        context: &TurnContext<'_>,
    ) -> Result<String, GatewayError>;
}
