//! Evaluate Round use case
//!
//! Scores the transcript after each completed round. The AI scorer is asked
//! first; any failure there falls back to the rule-based heuristic, and a
//! failure of the heuristic itself falls back to a static evaluation.
//! Callers always get a structurally valid [`RoundEvaluationResult`].

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::use_cases::degrade::{Tier, run_tiered};
use async_trait::async_trait;
use roundtable_domain::{
    ConsensusMetrics, ConsensusTuning, DecisionEvolution, DynamicRoundConfig, EvaluationSource,
    Model, PersonaPosition, PromptTemplate, ResolvedTables, RoundEvaluationResult, Turn,
    consensus::{
        extract_next_round_focus, extract_persona_positions, generate_rule_based_consensus,
        is_consensus_reached, is_threshold_reached, parse_scorer_response, phase_focus,
        track_decision_evolution,
    },
    generate_recommended_order,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors an evaluator may report to the round controller
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Scorer gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Scorer reply contained no JSON object")]
    NoJsonObject,

    #[error("Evaluation failed: {0}")]
    Failed(String),
}

/// Seam between the round controller and whatever evaluates rounds
#[async_trait]
pub trait RoundEvaluator: Send + Sync {
    async fn evaluate_round(
        &self,
        turns: &[Turn],
        config: &DynamicRoundConfig,
        current_round: u32,
    ) -> Result<RoundEvaluationResult, EvaluationError>;
}

/// Consensus evaluator backed by an LLM scorer
pub struct ConsensusEvaluator<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    scorer_model: Model,
    tables: ResolvedTables,
    tuning: ConsensusTuning,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl<G: LlmGateway + 'static> ConsensusEvaluator<G> {
    pub fn new(gateway: Arc<G>, scorer_model: Model, tables: ResolvedTables) -> Self {
        Self {
            gateway,
            scorer_model,
            tables,
            tuning: ConsensusTuning::default(),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_tuning(mut self, tuning: ConsensusTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn tuning(&self) -> &ConsensusTuning {
        &self.tuning
    }

    /// Evaluate `turns`, the transcript through `current_round`. Never fails.
    pub async fn evaluate(
        &self,
        turns: &[Turn],
        config: &DynamicRoundConfig,
        current_round: u32,
    ) -> RoundEvaluationResult {
        let (result, tier) = run_tiered(
            "consensus evaluation",
            async {
                let metrics = self.ai_assisted_metrics(turns, current_round).await?;
                Ok::<_, EvaluationError>(self.build_result(metrics, config, current_round))
            },
            || {
                let metrics = self.generate_rule_based_consensus(turns, current_round);
                self.build_result(metrics, config, current_round)
            },
            || self.generate_fallback_evaluation(turns, config, current_round),
        )
        .await;

        let source = match tier {
            Tier::Primary => EvaluationSource::AiAssisted,
            Tier::Secondary => EvaluationSource::RuleBased,
            Tier::Fallback => EvaluationSource::StaticFallback,
        };
        let result = RoundEvaluationResult { source, ..result };

        info!(
            "Round {} evaluated ({}): score {}, {} issues, {} conflicts, terminate={}",
            current_round,
            source.as_str(),
            result.metrics.agreement_score,
            result.metrics.unresolved_issues.len(),
            result.metrics.conflict_count(),
            result.should_terminate
        );
        result
    }

    /// Ask the scorer and parse its reply
    async fn ai_assisted_metrics(
        &self,
        turns: &[Turn],
        current_round: u32,
    ) -> Result<ConsensusMetrics, EvaluationError> {
        let session = self
            .gateway
            .create_session_with_system_prompt(
                &self.scorer_model,
                PromptTemplate::consensus_analysis_system(),
            )
            .await?;
        let prompt = PromptTemplate::consensus_analysis(turns, current_round);
        let reply = session.send(&prompt).await?;

        self.conversation_logger.log(ConversationEvent::scorer_response(
            current_round,
            &self.scorer_model,
            &reply,
        ));

        let metrics = parse_scorer_response(&reply, &self.tuning)
            .ok_or(EvaluationError::NoJsonObject)?;
        debug!("Scorer metrics for round {}: {:?}", current_round, metrics);
        Ok(metrics)
    }

    fn build_result(
        &self,
        metrics: ConsensusMetrics,
        config: &DynamicRoundConfig,
        current_round: u32,
    ) -> RoundEvaluationResult {
        RoundEvaluationResult {
            should_terminate: self.should_terminate_discussion(&metrics, config, current_round),
            next_round_focus: extract_next_round_focus(&metrics),
            recommended_order: generate_recommended_order(&metrics, config, &self.tables),
            metrics,
            // overwritten by `evaluate` once the tier is known
            source: EvaluationSource::AiAssisted,
        }
    }

    pub fn generate_rule_based_consensus(
        &self,
        turns: &[Turn],
        current_round: u32,
    ) -> ConsensusMetrics {
        generate_rule_based_consensus(turns, current_round, &self.tuning)
    }

    pub fn should_terminate_discussion(
        &self,
        metrics: &ConsensusMetrics,
        config: &DynamicRoundConfig,
        current_round: u32,
    ) -> bool {
        is_consensus_reached(metrics, config, current_round)
    }

    /// Last-resort evaluation.
    ///
    /// Rule-based metrics (or the fixed fallback metrics if even those cannot
    /// be computed), termination from round and threshold alone, one generic
    /// focus line and the moderator-free exploration order.
    pub fn generate_fallback_evaluation(
        &self,
        turns: &[Turn],
        config: &DynamicRoundConfig,
        current_round: u32,
    ) -> RoundEvaluationResult {
        let metrics = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.generate_rule_based_consensus(turns, current_round)
        }))
        .unwrap_or_else(|_| ConsensusMetrics::evaluation_fallback());

        RoundEvaluationResult {
            should_terminate: is_threshold_reached(&metrics, config, current_round),
            next_round_focus: vec![phase_focus(metrics.discussion_phase).to_string()],
            recommended_order: self
                .tables
                .base_order(roundtable_domain::DiscussionPhase::Exploration)
                .to_vec(),
            metrics,
            source: EvaluationSource::StaticFallback,
        }
    }

    pub fn extract_persona_positions(
        &self,
        turns: &[Turn],
    ) -> BTreeMap<String, Vec<PersonaPosition>> {
        extract_persona_positions(turns, &self.tuning)
    }

    pub fn track_decision_evolution(&self, turns: &[Turn], round: u32) -> Vec<DecisionEvolution> {
        track_decision_evolution(turns, round, &self.tuning)
    }
}

#[async_trait]
impl<G: LlmGateway + 'static> RoundEvaluator for ConsensusEvaluator<G> {
    async fn evaluate_round(
        &self,
        turns: &[Turn],
        config: &DynamicRoundConfig,
        current_round: u32,
    ) -> Result<RoundEvaluationResult, EvaluationError> {
        Ok(self.evaluate(turns, config, current_round).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::LlmSession;
    use roundtable_domain::{DiscussionPhase, OrderingTables, RoleRoster};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    enum Scripted {
        Reply(String),
        Fail,
    }

    struct ScriptedSession {
        model: Model,
        reply: Option<String>,
    }

    #[async_trait]
    impl LlmSession for ScriptedSession {
        fn model(&self) -> &Model {
            &self.model
        }

        async fn send(&self, _content: &str) -> Result<String, GatewayError> {
            self.reply
                .clone()
                .ok_or_else(|| GatewayError::RequestFailed("scorer offline".to_string()))
        }
    }

    struct ScriptedGateway {
        replies: Mutex<VecDeque<Scripted>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn new(replies: Vec<Scripted>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn create_session(&self, model: &Model) -> Result<Box<dyn LlmSession>, GatewayError> {
            let next = self.replies.lock().unwrap().pop_front();
            match next {
                Some(Scripted::Reply(text)) => Ok(Box::new(ScriptedSession {
                    model: model.clone(),
                    reply: Some(text),
                })),
                Some(Scripted::Fail) | None => Ok(Box::new(ScriptedSession {
                    model: model.clone(),
                    reply: None,
                })),
            }
        }

        async fn create_session_with_system_prompt(
            &self,
            model: &Model,
            system_prompt: &str,
        ) -> Result<Box<dyn LlmSession>, GatewayError> {
            self.prompts.lock().unwrap().push(system_prompt.to_string());
            self.create_session(model).await
        }

        async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
            Ok(vec![Model::default()])
        }
    }

    fn evaluator(replies: Vec<Scripted>) -> ConsensusEvaluator<ScriptedGateway> {
        let tables = OrderingTables::default()
            .resolve(&RoleRoster::default())
            .unwrap();
        ConsensusEvaluator::new(Arc::new(ScriptedGateway::new(replies)), Model::default(), tables)
    }

    /// The last two rounds of a transcript, one turn per role each
    fn transcript_through(round: u32) -> Vec<Turn> {
        let roles = [
            ("Architect", "architect"),
            ("Senior Developer", "developer"),
            ("Security Expert", "security"),
            ("QA Engineer", "qa"),
            ("Product Manager", "product"),
            ("Moderator", "moderator"),
        ];
        let filler = "We agree on the plan and the rollout looks sound to everyone here, \
                      the remaining steps are clear and the schedule fits the team.";
        (round.saturating_sub(1).max(1)..=round)
            .flat_map(|r| {
                roles
                    .iter()
                    .map(move |(name, role)| Turn::new(r, *name, *role, filler))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_ai_assisted_reply_is_used() {
        let reply = r#"Here you go: {"agreementScore": 82.6, "unresolvedIssues": ["rollout"],
            "conflictingPositions": {}, "confidenceLevel": "90", "discussionPhase": "resolution"}"#;
        let eval = evaluator(vec![Scripted::Reply(reply.to_string())]);
        let config = DynamicRoundConfig::default();

        let result = eval.evaluate(&transcript_through(4), &config, 4).await;
        assert_eq!(result.source, EvaluationSource::AiAssisted);
        assert_eq!(result.metrics.agreement_score, 83);
        assert_eq!(result.metrics.confidence_level, 90);
        assert_eq!(result.metrics.discussion_phase, DiscussionPhase::Resolution);
        assert!(result.should_terminate);
        assert_eq!(result.recommended_order, vec![2, 3, 1, 0, 4]);
        assert!(result.next_round_focus.len() <= 4);
    }

    #[tokio::test]
    async fn test_missing_confidence_uses_ai_constant() {
        let reply = r#"{"agreementScore": 40}"#;
        let eval = evaluator(vec![Scripted::Reply(reply.to_string())]);
        let result = eval.evaluate(&[], &DynamicRoundConfig::default(), 2).await;
        assert_eq!(result.metrics.confidence_level, 80);
        assert_eq!(result.metrics.discussion_phase, DiscussionPhase::Exploration);
        assert!(result.metrics.unresolved_issues.is_empty());
    }

    #[tokio::test]
    async fn test_gateway_failure_falls_back_to_rule_based() {
        let eval = evaluator(vec![Scripted::Fail]);
        let result = eval.evaluate(&[], &DynamicRoundConfig::default(), 1).await;
        assert_eq!(result.source, EvaluationSource::RuleBased);
        assert!((20..=45).contains(&result.metrics.agreement_score));
        assert!(result.metrics.unresolved_issues.len() >= 2);
        assert_eq!(result.metrics.discussion_phase, DiscussionPhase::Exploration);
        assert_eq!(result.metrics.confidence_level, 50);
        assert!(!result.should_terminate);
    }

    #[tokio::test]
    async fn test_reply_without_json_falls_back() {
        let eval = evaluator(vec![Scripted::Reply("I think they mostly agree.".to_string())]);
        let result = eval.evaluate(&[], &DynamicRoundConfig::default(), 1).await;
        assert_eq!(result.source, EvaluationSource::RuleBased);
    }

    #[tokio::test]
    async fn test_full_round_without_conflicts() {
        // Scenario: rounds 4 and 5, 12 turns, 6 roles, no conflict keywords
        let eval = evaluator(vec![Scripted::Fail]);
        let config = DynamicRoundConfig::default();
        let result = eval.evaluate(&transcript_through(5), &config, 5).await;

        let metrics = &result.metrics;
        assert!(metrics.conflicting_positions.is_empty());
        let expected = u32::from(metrics.agreement_score) >= config.consensus_threshold
            && metrics.unresolved_issues.len() <= config.conflict_tolerance as usize;
        assert_eq!(result.should_terminate, expected);
    }

    #[tokio::test]
    async fn test_conflict_keywords_mark_role() {
        let eval = evaluator(vec![Scripted::Fail]);
        let turns = vec![Turn::new(
            2,
            "Architect",
            "Architect",
            "However, I disagree with splitting the service now.",
        )];
        let result = eval.evaluate(&turns, &DynamicRoundConfig::default(), 2).await;
        assert!(result.metrics.conflicting_positions.contains_key("Architect"));
        assert_eq!(result.metrics.conflicting_positions["Architect"].len(), 1);
    }

    #[tokio::test]
    async fn test_scorer_gets_analysis_prompt() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Scripted::Fail]));
        let tables = OrderingTables::default()
            .resolve(&RoleRoster::default())
            .unwrap();
        let eval = ConsensusEvaluator::new(Arc::clone(&gateway), Model::default(), tables);
        eval.evaluate(&[], &DynamicRoundConfig::default(), 1).await;

        let prompts = gateway.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0], PromptTemplate::consensus_analysis_system());
    }

    #[test]
    fn test_fallback_evaluation_ignores_conflicts() {
        let eval = evaluator(vec![]);
        let config = DynamicRoundConfig::default().with_threshold(20);
        let turns = vec![Turn::new(4, "QA Engineer", "qa", "But the issue remains.")];

        let result = eval.generate_fallback_evaluation(&turns, &config, 4);
        assert_eq!(result.source, EvaluationSource::StaticFallback);
        assert!(result.metrics.has_conflicts());
        assert!(result.should_terminate);
        assert_eq!(result.next_round_focus.len(), 1);
        assert_eq!(result.recommended_order, vec![4, 0, 1, 2, 3]);
    }

    #[test]
    fn test_positions_and_evolution_use_tuning() {
        let eval = evaluator(vec![]);
        let turns = vec![
            Turn::new(1, "Architect", "architect", "We should deploy with Docker."),
            Turn::new(1, "QA Engineer", "qa", "Agreed, docker deployment works."),
        ];
        assert!(eval.extract_persona_positions(&turns).contains_key("deployment"));
        let evolution = eval.track_decision_evolution(&turns, 1);
        assert!(evolution.iter().any(|e| e.topic == "deployment" && e.resolved));
    }
}
