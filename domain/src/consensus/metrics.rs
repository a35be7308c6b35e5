//! Consensus assessment types

use crate::discussion::role::RoleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coarse stage of a discussion, used to bias ordering and focus text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscussionPhase {
    #[default]
    Exploration,
    Alignment,
    Resolution,
    Finalization,
}

impl DiscussionPhase {
    pub const ALL: [DiscussionPhase; 4] = [
        DiscussionPhase::Exploration,
        DiscussionPhase::Alignment,
        DiscussionPhase::Resolution,
        DiscussionPhase::Finalization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscussionPhase::Exploration => "exploration",
            DiscussionPhase::Alignment => "alignment",
            DiscussionPhase::Resolution => "resolution",
            DiscussionPhase::Finalization => "finalization",
        }
    }
}

impl std::fmt::Display for DiscussionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DiscussionPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exploration" => Ok(DiscussionPhase::Exploration),
            "alignment" => Ok(DiscussionPhase::Alignment),
            "resolution" => Ok(DiscussionPhase::Resolution),
            "finalization" => Ok(DiscussionPhase::Finalization),
            other => Err(format!("unknown discussion phase '{}'", other)),
        }
    }
}

/// Scored assessment of agreement and conflict for one round.
///
/// Created fresh per evaluation and never mutated afterwards. Both numeric
/// fields are clamped to 0..=100 on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusMetrics {
    pub agreement_score: u8,
    pub unresolved_issues: Vec<String>,
    /// Role identifier → descriptions of the positions it is holding out on
    pub conflicting_positions: BTreeMap<String, Vec<String>>,
    pub confidence_level: u8,
    pub discussion_phase: DiscussionPhase,
}

/// Issue carried by the seeded and fallback metrics
pub const GENERIC_ISSUE: &str = "Initial positions and requirements need to be established";

fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

impl ConsensusMetrics {
    pub fn new(
        agreement_score: i64,
        unresolved_issues: Vec<String>,
        conflicting_positions: BTreeMap<String, Vec<String>>,
        confidence_level: i64,
        discussion_phase: DiscussionPhase,
    ) -> Self {
        Self {
            agreement_score: clamp_percent(agreement_score),
            unresolved_issues,
            conflicting_positions,
            confidence_level: clamp_percent(confidence_level),
            discussion_phase,
        }
    }

    /// Metrics round 1 starts from: nothing has been said yet
    pub fn seed() -> Self {
        Self::new(
            0,
            vec![GENERIC_ISSUE.to_string()],
            BTreeMap::new(),
            0,
            DiscussionPhase::Exploration,
        )
    }

    /// Metrics substituted when the evaluator itself fails
    pub fn evaluation_fallback() -> Self {
        Self::new(
            60,
            vec![GENERIC_ISSUE.to_string()],
            BTreeMap::new(),
            0,
            DiscussionPhase::Exploration,
        )
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicting_positions.is_empty()
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicting_positions.len()
    }

    /// Record `description` against `role`, keeping one key per role
    pub fn add_conflict(
        positions: &mut BTreeMap<String, Vec<String>>,
        role: &RoleId,
        description: &str,
    ) {
        positions
            .entry(role.as_str().to_string())
            .or_default()
            .push(description.to_string());
    }
}

/// Which degradation tier produced an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationSource {
    AiAssisted,
    RuleBased,
    StaticFallback,
}

impl EvaluationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationSource::AiAssisted => "ai_assisted",
            EvaluationSource::RuleBased => "rule_based",
            EvaluationSource::StaticFallback => "static_fallback",
        }
    }
}

/// Result of evaluating one completed round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundEvaluationResult {
    pub metrics: ConsensusMetrics,
    pub should_terminate: bool,
    /// At most four focus lines for the next round
    pub next_round_focus: Vec<String>,
    /// Distinct participant indices, 3 to 6 long
    pub recommended_order: Vec<usize>,
    pub source: EvaluationSource,
}

/// A single role's stance on one detected issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaPosition {
    pub role: RoleId,
    pub position: String,
    pub reasoning: String,
    /// 0..=95
    pub confidence: u8,
}

/// How the group's stance on one topic looks in a given round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionEvolution {
    pub round: u32,
    pub topic: String,
    pub positions: BTreeMap<String, String>,
    pub agreement_level: u8,
    pub resolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_numeric_fields() {
        let metrics = ConsensusMetrics::new(
            250,
            vec![],
            BTreeMap::new(),
            -7,
            DiscussionPhase::Alignment,
        );
        assert_eq!(metrics.agreement_score, 100);
        assert_eq!(metrics.confidence_level, 0);
    }

    #[test]
    fn test_seed_and_fallback() {
        let seed = ConsensusMetrics::seed();
        assert_eq!(seed.agreement_score, 0);
        assert_eq!(seed.discussion_phase, DiscussionPhase::Exploration);
        assert_eq!(seed.unresolved_issues.len(), 1);

        let fallback = ConsensusMetrics::evaluation_fallback();
        assert_eq!(fallback.agreement_score, 60);
        assert_eq!(fallback.unresolved_issues.len(), 1);
        assert!(!fallback.has_conflicts());
    }

    #[test]
    fn test_add_conflict_keeps_single_key() {
        let mut positions = BTreeMap::new();
        let role = RoleId::from("architect");
        ConsensusMetrics::add_conflict(&mut positions, &role, "first");
        ConsensusMetrics::add_conflict(&mut positions, &role, "second");
        assert_eq!(positions.len(), 1);
        assert_eq!(positions["architect"], vec!["first", "second"]);
    }

    #[test]
    fn test_phase_parse_and_serde() {
        assert_eq!(
            "Resolution".parse::<DiscussionPhase>(),
            Ok(DiscussionPhase::Resolution)
        );
        assert!("closing".parse::<DiscussionPhase>().is_err());
        assert_eq!(
            serde_json::to_string(&DiscussionPhase::Finalization).unwrap(),
            "\"finalization\""
        );
    }

    #[test]
    fn test_metrics_serialize_camel_case() {
        let value = serde_json::to_value(ConsensusMetrics::seed()).unwrap();
        assert!(value.get("agreementScore").is_some());
        assert!(value.get("discussionPhase").is_some());
    }
}
