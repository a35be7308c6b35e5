//! Participant turns through an LLM gateway

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::participant::{ParticipantPort, TurnContext};
use async_trait::async_trait;
use roundtable_domain::{Model, PromptTemplate, RoleSpec};
use std::sync::Arc;
use tracing::debug;

/// [`ParticipantPort`] that asks one model to play every role.
///
/// Each turn opens a fresh session with the role's system prompt; the
/// transcript in the prompt is the only shared memory.
pub struct GatewayParticipant {
    gateway: Arc<dyn LlmGateway>,
    model: Model,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl GatewayParticipant {
    pub fn new(gateway: Arc<dyn LlmGateway>, model: Model) -> Self {
        Self {
            gateway,
            model,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }
}

#[async_trait]
impl ParticipantPort for GatewayParticipant {
    async fn generate_turn(
        &self,
        role: &RoleSpec,
        context: &TurnContext<'_>,
    ) -> Result<String, GatewayError> {
        let system_prompt = PromptTemplate::participant_system(role);
        let prompt = PromptTemplate::turn_prompt(
            context.topic.content(),
            context.round,
            context.transcript.turns(),
            context.focus,
            context.directive,
            context.context_policy,
        );
        debug!(
            "Prompting {} for round {} ({} bytes, context {})",
            role.id,
            context.round,
            prompt.len(),
            context.context_policy
        );

        self.conversation_logger.log(ConversationEvent::participant_prompt(
            context.round,
            role,
            &self.model,
            prompt.len(),
        ));

        let session = self
            .gateway
            .create_session_with_system_prompt(&self.model, &system_prompt)
            .await?;
        let reply = session.send(&prompt).await?;

        let trimmed = reply.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(trimmed.to_string())
    }
}
