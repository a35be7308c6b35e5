//! Run Discussion use case
//!
//! The round controller. Drives the discussion round by round: asks the
//! participants in the order the round strategy picks, evaluates each
//! completed round, stops on consensus and closes with a forced final round
//! when the rounds run out.
//!
//! ```text
//! Idle → RunningRound → Evaluating → RunningRound ...
//!                                  → Terminated(Consensus)
//!                                  → ForcedFinalRound → Terminated(ForcedFinalRound)
//! ```

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::participant::{ParticipantPort, TurnContext};
use crate::ports::progress::{DiscussionProgressNotifier, NoProgress};
use crate::use_cases::evaluate_round::RoundEvaluator;
use crate::use_cases::round_strategy::RoundStrategy;
use chrono::Utc;
use roundtable_domain::{
    ConsensusMetrics, DiscussionRecord, DomainError, DynamicRoundConfig, EvaluationSource,
    OrderingTables, PromptTemplate, RoleRoster, RoundEvaluationResult, TerminationReason, Topic,
    Transcript, Turn, extract_next_round_focus,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur before a discussion starts
#[derive(Error, Debug)]
pub enum RunDiscussionError {
    #[error("Invalid discussion request: {0}")]
    InvalidRequest(#[from] DomainError),
}

/// Input for the RunDiscussion use case
#[derive(Debug, Clone)]
pub struct RunDiscussionInput {
    pub topic: String,
    pub config: DynamicRoundConfig,
    pub roster: RoleRoster,
    pub tables: OrderingTables,
}

impl RunDiscussionInput {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            config: DynamicRoundConfig::default(),
            roster: RoleRoster::default(),
            tables: OrderingTables::default(),
        }
    }

    pub fn with_config(mut self, config: DynamicRoundConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_roster(mut self, roster: RoleRoster, tables: OrderingTables) -> Self {
        self.roster = roster;
        self.tables = tables;
        self
    }
}

/// Where the controller is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    RunningRound(u32),
    Evaluating(u32),
    ForcedFinalRound(u32),
    Terminated(TerminationReason),
}

/// Use case for running a discussion
pub struct RunDiscussionUseCase {
    participants: Arc<dyn ParticipantPort>,
    evaluator: Arc<dyn RoundEvaluator>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl RunDiscussionUseCase {
    pub fn new(participants: Arc<dyn ParticipantPort>, evaluator: Arc<dyn RoundEvaluator>) -> Self {
        Self {
            participants,
            evaluator,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunDiscussionInput,
    ) -> Result<DiscussionRecord, RunDiscussionError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks.
    ///
    /// Fails only when the request itself is invalid; nothing that happens
    /// once the first round starts ends the discussion early.
    pub async fn execute_with_progress(
        &self,
        input: RunDiscussionInput,
        progress: &dyn DiscussionProgressNotifier,
    ) -> Result<DiscussionRecord, RunDiscussionError> {
        let topic: Topic = input.topic.parse()?;
        input.config.validate().map_err(DomainError::from)?;
        if input.roster.is_empty() {
            return Err(DomainError::EmptyRoster.into());
        }
        let tables = input.tables.resolve(&input.roster).map_err(DomainError::from)?;

        let mut run = DiscussionRun {
            use_case: self,
            progress,
            topic,
            config: input.config,
            roster: input.roster,
            strategy: RoundStrategy::new(tables),
            state: ControllerState::Idle,
            transcript: Transcript::new(),
            history: Vec::new(),
            previous_orders: Vec::new(),
        };
        Ok(run.drive().await)
    }
}

/// State of one discussion while it runs
struct DiscussionRun<'a> {
    use_case: &'a RunDiscussionUseCase,
    progress: &'a dyn DiscussionProgressNotifier,
    topic: Topic,
    config: DynamicRoundConfig,
    roster: RoleRoster,
    strategy: RoundStrategy,
    state: ControllerState,
    transcript: Transcript,
    history: Vec<ConsensusMetrics>,
    previous_orders: Vec<Vec<usize>>,
}

impl DiscussionRun<'_> {
    async fn drive(&mut self) -> DiscussionRecord {
        let started_at = Utc::now();
        info!(
            "Starting discussion on '{}' ({}..={} rounds, dynamic={})",
            self.topic, self.config.min_rounds, self.config.max_rounds, self.config.enabled
        );
        self.progress
            .on_discussion_start(&self.topic, self.config.max_rounds);
        self.log(ConversationEvent::discussion_started(
            &self.topic,
            &self.config,
            &self.roster,
        ));

        let mut round = 1;
        let mut metrics = ConsensusMetrics::seed();
        let mut focus = extract_next_round_focus(&metrics);

        let termination = loop {
            self.transition(ControllerState::RunningRound(round));
            let order = self
                .strategy
                .generate_next_round(round, &metrics, &self.config, &self.previous_orders);
            self.run_round(round, &order, &focus, None).await;
            self.previous_orders.push(order);

            if round >= self.config.max_rounds {
                break None;
            }

            self.transition(ControllerState::Evaluating(round));
            let result = self.evaluate(round).await;
            self.history.push(result.metrics.clone());

            if self.config.enabled && result.should_terminate && round > self.config.min_rounds {
                info!("Consensus reached after round {}", round);
                break Some(TerminationReason::Consensus);
            }

            round += 1;
            focus = result.next_round_focus;
            metrics = result.metrics;
        };

        let (termination, consensus_reached) = match termination {
            Some(reason) => (reason, true),
            None if self.config.enabled => {
                self.run_forced_final_round(round).await;
                round += 1;
                (TerminationReason::ForcedFinalRound, true)
            }
            None => (TerminationReason::RoundLimit, false),
        };
        self.transition(ControllerState::Terminated(termination));

        let record = DiscussionRecord {
            topic: self.topic.clone(),
            config: self.config,
            roster: self.roster.clone(),
            rounds: std::mem::take(&mut self.transcript).into_turns(),
            consensus_history: std::mem::take(&mut self.history),
            current_round: round,
            consensus_reached,
            termination,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            "Discussion finished: {} after {} rounds ({} turns)",
            termination,
            record.current_round,
            record.rounds.len()
        );
        self.log(ConversationEvent::discussion_finished(&record));
        self.progress.on_discussion_complete(&record);
        record
    }

    /// One extra round after `last_round`, decision maker first, with the
    /// agreement directive built from the last evaluated metrics
    async fn run_forced_final_round(&mut self, last_round: u32) {
        let round = last_round + 1;
        self.transition(ControllerState::ForcedFinalRound(round));
        warn!(
            "No consensus after {} rounds, running forced final round",
            last_round
        );
        self.progress.on_forced_final_round(round);

        let last = self
            .history
            .last()
            .cloned()
            .unwrap_or_else(ConsensusMetrics::seed);
        let directive = PromptTemplate::forced_agreement_directive(&last);
        let focus = extract_next_round_focus(&last);
        let order = self.strategy.final_round_order(&self.config);

        self.log(ConversationEvent::forced_final_round(round, &order, &directive));
        self.run_round(round, &order, &focus, Some(&directive)).await;
        self.previous_orders.push(order);
    }

    /// Ask every participant in `order`; failed turns are skipped
    async fn run_round(
        &mut self,
        round: u32,
        order: &[usize],
        focus: &[String],
        directive: Option<&str>,
    ) {
        let context_policy = self.strategy.optimize_context(round);
        let estimate = self
            .strategy
            .estimate_token_usage(self.transcript.turns(), order.len(), round);
        info!(
            "Round {}: {} speakers, context {}",
            round,
            order.len(),
            context_policy
        );
        debug!(
            "Round {} token estimate: transcript {}, projected {}",
            round, estimate.transcript_tokens, estimate.projected_next_round
        );
        self.progress.on_round_start(round, order.len());

        for &index in order {
            let Some(role) = self.roster.get(index) else {
                warn!("Order references unknown participant {}, skipping", index);
                continue;
            };

            let context = TurnContext {
                topic: &self.topic,
                round,
                transcript: &self.transcript,
                focus,
                directive,
                context_policy,
            };

            let outcome = self
                .use_case
                .participants
                .generate_turn(role, &context)
                .await;
            match outcome {
                Ok(content) => {
                    debug!("{} spoke in round {}", role.id, round);
                    let turn = Turn::new(round, role.display_name.clone(), role.id.clone(), content);
                    self.log(ConversationEvent::turn(&turn));
                    self.transcript.push(turn);
                    self.progress.on_turn_complete(round, role, true);
                }
                Err(e) => {
                    warn!("{} failed to speak in round {}: {}", role.id, round, e);
                    self.log(ConversationEvent::turn_failed(round, role, &e.to_string()));
                    self.progress.on_turn_complete(round, role, false);
                }
            }
        }
    }

    /// Evaluate the transcript as it stands after `round`; an evaluator
    /// error yields the fixed fallback metrics and never terminates
    async fn evaluate(&mut self, round: u32) -> RoundEvaluationResult {
        let outcome = self
            .use_case
            .evaluator
            .evaluate_round(self.transcript.through_round(round), &self.config, round)
            .await;
        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!("Evaluation of round {} failed: {}", round, e);
                let metrics = ConsensusMetrics::evaluation_fallback();
                RoundEvaluationResult {
                    should_terminate: false,
                    next_round_focus: extract_next_round_focus(&metrics),
                    recommended_order: self
                        .strategy
                        .tables()
                        .base_order(metrics.discussion_phase)
                        .to_vec(),
                    metrics,
                    source: EvaluationSource::StaticFallback,
                }
            }
        };

        self.log(ConversationEvent::round_evaluated(round, &result));
        self.progress.on_evaluation(round, &result);
        result
    }

    fn transition(&mut self, next: ControllerState) {
        debug!("Controller: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn log(&self, event: ConversationEvent) {
        self.use_case.conversation_logger.log(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
    use crate::use_cases::evaluate_round::{ConsensusEvaluator, EvaluationError};
    use async_trait::async_trait;
    use roundtable_domain::{DiscussionPhase, Model, RoleSpec};
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::Mutex;

    const AGREEING_TURN: &str = "I agree with the layered approach and we have reached \
        consensus on the rollout plan, the migration order and the staging checks, so the team \
        can start with the first milestone and report progress at the next weekly review \
        meeting together.";

    /// Participant that answers with its role id and fails on request
    struct ScriptedParticipants {
        failing_roles: Vec<&'static str>,
        reply: Option<&'static str>,
        calls: Mutex<Vec<(u32, String, Option<String>)>>,
    }

    impl ScriptedParticipants {
        fn new() -> Self {
            Self {
                failing_roles: vec![],
                reply: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(roles: Vec<&'static str>) -> Self {
            Self {
                failing_roles: roles,
                ..Self::new()
            }
        }

        fn replying(reply: &'static str) -> Self {
            Self {
                reply: Some(reply),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl ParticipantPort for ScriptedParticipants {
        async fn generate_turn(
            &self,
            role: &RoleSpec,
            context: &TurnContext<'_>,
        ) -> Result<String, GatewayError> {
            self.calls.lock().unwrap().push((
                context.round,
                role.id.to_string(),
                context.directive.map(str::to_string),
            ));
            if self.failing_roles.contains(&role.id.as_str()) {
                return Err(GatewayError::Timeout);
            }
            Ok(match self.reply {
                Some(reply) => reply.to_string(),
                None => format!("{} speaking in round {}", role.id, context.round),
            })
        }
    }

    /// Scorer that is never reachable, so every round is scored by the
    /// rule-based heuristic
    struct OfflineScorer;

    #[async_trait]
    impl LlmGateway for OfflineScorer {
        async fn create_session(&self, _model: &Model) -> Result<Box<dyn LlmSession>, GatewayError> {
            Err(GatewayError::ConnectionError("scorer offline".to_string()))
        }

        async fn create_session_with_system_prompt(
            &self,
            model: &Model,
            _system_prompt: &str,
        ) -> Result<Box<dyn LlmSession>, GatewayError> {
            self.create_session(model).await
        }

        async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
            Ok(vec![])
        }
    }

    enum Step {
        Result { score: i64, terminate: bool },
        Error,
    }

    /// Evaluator replaying scripted results, neutral once the script runs out
    struct ScriptedEvaluator {
        steps: Mutex<VecDeque<Step>>,
        seen_rounds: Mutex<Vec<(u32, usize)>>,
    }

    impl ScriptedEvaluator {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                seen_rounds: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RoundEvaluator for ScriptedEvaluator {
        async fn evaluate_round(
            &self,
            turns: &[Turn],
            _config: &DynamicRoundConfig,
            current_round: u32,
        ) -> Result<RoundEvaluationResult, EvaluationError> {
            self.seen_rounds
                .lock()
                .unwrap()
                .push((current_round, turns.len()));
            let step = self
                .steps
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Step::Result {
                    score: 30,
                    terminate: false,
                });
            match step {
                Step::Error => Err(EvaluationError::Failed("scorer crashed".to_string())),
                Step::Result { score, terminate } => {
                    let metrics = ConsensusMetrics::new(
                        score,
                        vec!["Open question".to_string()],
                        BTreeMap::new(),
                        50,
                        DiscussionPhase::Alignment,
                    );
                    Ok(RoundEvaluationResult {
                        next_round_focus: extract_next_round_focus(&metrics),
                        recommended_order: vec![0, 1, 2, 3, 4],
                        metrics,
                        should_terminate: terminate,
                        source: EvaluationSource::RuleBased,
                    })
                }
            }
        }
    }

    fn use_case(
        participants: Arc<ScriptedParticipants>,
        evaluator: Arc<ScriptedEvaluator>,
    ) -> RunDiscussionUseCase {
        RunDiscussionUseCase::new(participants, evaluator)
    }

    fn input(min: u32, max: u32) -> RunDiscussionInput {
        RunDiscussionInput::new("Should we adopt event sourcing?")
            .with_config(DynamicRoundConfig::default().with_rounds(min, max))
    }

    #[tokio::test]
    async fn test_forced_final_round_when_rounds_run_out() {
        let participants = Arc::new(ScriptedParticipants::new());
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![]));
        let record = use_case(participants.clone(), evaluator.clone())
            .execute(input(1, 3))
            .await
            .unwrap();

        assert!(record.consensus_reached);
        assert_eq!(record.termination, TerminationReason::ForcedFinalRound);
        assert_eq!(record.current_round, 4);
        assert_eq!(record.round_numbers(), vec![1, 2, 3, 4]);
        // rounds 1 and 2 evaluated, the last regular round is not
        assert_eq!(record.consensus_history.len(), 2);

        let calls = participants.calls.lock().unwrap();
        let forced: Vec<_> = calls.iter().filter(|(round, _, _)| *round == 4).collect();
        let speakers: Vec<&str> = forced.iter().map(|(_, role, _)| role.as_str()).collect();
        assert_eq!(
            speakers,
            vec!["product", "moderator", "architect", "developer", "security", "qa"]
        );
        assert!(forced.iter().all(|(_, _, directive)| {
            directive
                .as_deref()
                .is_some_and(|d| d.contains("You must reach agreement on: Open question"))
        }));
        assert!(calls.iter().filter(|(r, _, _)| *r < 4).all(|(_, _, d)| d.is_none()));
    }

    #[tokio::test]
    async fn test_consensus_requires_round_above_min() {
        let participants = Arc::new(ScriptedParticipants::new());
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![
            Step::Result { score: 90, terminate: true },
            Step::Result { score: 90, terminate: true },
            Step::Result { score: 90, terminate: true },
        ]));
        let record = use_case(participants, evaluator.clone())
            .execute(input(2, 6))
            .await
            .unwrap();

        assert_eq!(record.termination, TerminationReason::Consensus);
        assert!(record.consensus_reached);
        // round 2 equals min_rounds, so round 3 is the first that can stop
        assert_eq!(record.current_round, 3);
        assert_eq!(evaluator.seen_rounds.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_evaluator_sees_growing_transcript() {
        let participants = Arc::new(ScriptedParticipants::new());
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![]));
        let record = use_case(participants, evaluator.clone())
            .execute(input(1, 4))
            .await
            .unwrap();

        let seen = evaluator.seen_rounds.lock().unwrap();
        assert_eq!(seen.iter().map(|(r, _)| *r).collect::<Vec<_>>(), vec![1, 2, 3]);
        let spoken = |round: u32| record.turns_in_round(round).count();
        assert!((5..=6).contains(&seen[0].1));
        assert_eq!(seen[0].1, spoken(1));
        assert_eq!(seen[1].1, spoken(1) + spoken(2));
        assert_eq!(seen[2].1, spoken(1) + spoken(2) + spoken(3));
    }

    #[tokio::test]
    async fn test_rule_based_run_reaches_finalization() {
        let participants = Arc::new(ScriptedParticipants::replying(AGREEING_TURN));
        let tables = OrderingTables::default()
            .resolve(&RoleRoster::default())
            .unwrap();
        let evaluator = Arc::new(ConsensusEvaluator::new(
            Arc::new(OfflineScorer),
            Model::default(),
            tables,
        ));
        let record = RunDiscussionUseCase::new(participants, evaluator)
            .execute(input(1, 8))
            .await
            .unwrap();

        let scores: Vec<u8> = record
            .consensus_history
            .iter()
            .map(|m| m.agreement_score)
            .collect();
        assert_eq!(scores, vec![45, 45, 65, 65, 85]);
        let last = record.final_metrics().unwrap();
        assert_eq!(last.discussion_phase, DiscussionPhase::Finalization);
        assert!(last.unresolved_issues.is_empty());
        assert_eq!(record.termination, TerminationReason::Consensus);
        assert_eq!(record.current_round, 5);
    }

    #[tokio::test]
    async fn test_evaluator_error_is_non_terminating() {
        let participants = Arc::new(ScriptedParticipants::new());
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![Step::Error, Step::Error]));
        let record = use_case(participants, evaluator)
            .execute(input(1, 3))
            .await
            .unwrap();

        assert_eq!(record.termination, TerminationReason::ForcedFinalRound);
        assert_eq!(record.consensus_history[0], ConsensusMetrics::evaluation_fallback());
        assert_eq!(record.consensus_history[0].agreement_score, 60);
    }

    #[tokio::test]
    async fn test_failed_turns_are_skipped() {
        let participants = Arc::new(ScriptedParticipants::failing(vec!["security", "qa"]));
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![]));
        let record = use_case(participants, evaluator)
            .execute(input(1, 2))
            .await
            .unwrap();

        assert!(record.rounds.iter().all(|t| t.role.as_str() != "security"));
        assert!(record.rounds.iter().all(|t| t.role.as_str() != "qa"));
        assert!(!record.turns_in_round(1).collect::<Vec<_>>().is_empty());
        assert!(record.consensus_reached);
    }

    #[tokio::test]
    async fn test_static_rounds_run_to_limit() {
        let participants = Arc::new(ScriptedParticipants::new());
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![
            Step::Result { score: 99, terminate: true },
            Step::Result { score: 99, terminate: true },
            Step::Result { score: 99, terminate: true },
        ]));
        let config = DynamicRoundConfig::default().with_rounds(1, 4).static_rounds();
        let record = use_case(participants, evaluator)
            .execute(RunDiscussionInput::new("Monorepo?").with_config(config))
            .await
            .unwrap();

        assert_eq!(record.termination, TerminationReason::RoundLimit);
        assert!(!record.consensus_reached);
        assert_eq!(record.current_round, 4);
        assert_eq!(record.round_numbers(), vec![1, 2, 3, 4]);
        assert_eq!(record.consensus_history.len(), 3);
    }

    #[tokio::test]
    async fn test_forced_round_without_moderator() {
        let participants = Arc::new(ScriptedParticipants::new());
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![]));
        let config = DynamicRoundConfig::default()
            .with_rounds(1, 1)
            .without_moderator();
        let record = use_case(participants.clone(), evaluator)
            .execute(RunDiscussionInput::new("Rewrite in Rust?").with_config(config))
            .await
            .unwrap();

        assert_eq!(record.current_round, 2);
        assert!(record.consensus_history.is_empty());
        assert!(record.rounds.iter().all(|t| t.role.as_str() != "moderator"));
        let forced: Vec<String> = participants
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(round, _, _)| *round == 2)
            .map(|(_, role, _)| role.clone())
            .collect();
        assert_eq!(forced, vec!["product", "architect", "developer", "security", "qa"]);
    }

    #[tokio::test]
    async fn test_consecutive_rounds_never_repeat_order() {
        let participants = Arc::new(ScriptedParticipants::new());
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![]));
        use_case(participants.clone(), evaluator)
            .execute(input(1, 5))
            .await
            .unwrap();

        let calls = participants.calls.lock().unwrap();
        let order_of = |round: u32| -> Vec<String> {
            calls
                .iter()
                .filter(|(r, _, _)| *r == round)
                .map(|(_, role, _)| role.clone())
                .collect()
        };
        for round in 2..=5 {
            assert_ne!(order_of(round - 1), order_of(round), "round {round}");
        }
    }

    #[tokio::test]
    async fn test_invalid_requests_rejected() {
        let participants = Arc::new(ScriptedParticipants::new());
        let evaluator = Arc::new(ScriptedEvaluator::new(vec![]));
        let uc = use_case(participants.clone(), evaluator);

        let empty = uc.execute(RunDiscussionInput::new("   ")).await;
        assert!(matches!(
            empty,
            Err(RunDiscussionError::InvalidRequest(DomainError::EmptyTopic))
        ));

        let bad_config = uc.execute(input(5, 2)).await;
        assert!(matches!(
            bad_config,
            Err(RunDiscussionError::InvalidRequest(DomainError::InvalidConfig(_)))
        ));

        let mut tables = OrderingTables::default();
        tables.phase_orders.exploration.pop();
        let bad_tables = uc
            .execute(RunDiscussionInput::new("Topic").with_roster(RoleRoster::default(), tables))
            .await;
        assert!(bad_tables.is_err());

        assert!(participants.calls.lock().unwrap().is_empty());
    }
}
