//! Tuning values of the rule-based consensus heuristic
//!
//! These are the score bands, keyword lists and confidence constants the
//! heuristic has always used. They are kept together as named parameters so
//! that callers can inspect or override them; [`ConsensusTuning::default`]
//! reproduces the stock values exactly.

use serde::{Deserialize, Serialize};

/// Parameters of [`generate_rule_based_consensus`](super::rule_based::generate_rule_based_consensus)
/// and the AI-path coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusTuning {
    /// Score every evaluation starts from
    pub base_score: u32,
    /// Largest bonus for distinct roles that spoke
    pub participation_bonus_max: u32,
    /// Distinct roles that earn the full participation bonus
    pub expected_roster_size: usize,
    /// Largest bonus for transcript volume
    pub depth_bonus_max: u32,
    /// Turn count that earns the full depth bonus
    pub expected_turns: usize,
    /// Largest bonus for turns carrying agreement markers
    pub agreement_bonus_max: u32,
    /// Ceiling for rounds `<= early_round_limit`
    pub early_round_cap: u32,
    pub early_round_limit: u32,
    /// Ceiling for rounds `<= middle_round_limit`
    pub middle_round_cap: u32,
    pub middle_round_limit: u32,
    /// Turns shorter than this many words count as thin
    pub short_turn_words: usize,
    /// More thin turns than this seeds the clarification issue
    pub short_turn_allowance: usize,
    /// Minimum round and score for each phase past exploration
    pub alignment_band: PhaseBand,
    pub resolution_band: PhaseBand,
    pub finalization_band: PhaseBand,
    /// Confidence reported by rule-based output
    pub rule_based_confidence: u8,
    /// Confidence assumed when the AI scorer omits the field
    pub ai_assisted_confidence: u8,
    /// Words signalling pushback; a hit makes the speaker a conflicting party
    pub conflict_markers: Vec<String>,
    /// Words signalling convergence
    pub agreement_markers: Vec<String>,
}

/// Round/score pair a discussion must reach to enter a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseBand {
    pub min_round: u32,
    pub min_score: u32,
}

/// Issue seeded when too many contributions are thin
pub const CLARIFICATION_ISSUE: &str = "Several contributions need more detail and clarification";

/// Issues seeded in the first rounds, before anything can be settled
pub const EARLY_ROUND_ISSUES: [&str; 2] = [
    "Core requirements are still being explored",
    "Implementation approach has not been agreed",
];

/// Description recorded against a role whose turn shows pushback
pub const CONFLICT_PLACEHOLDER: &str = "Raised concerns or alternatives that are not yet resolved";

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for ConsensusTuning {
    fn default() -> Self {
        Self {
            base_score: 20,
            participation_bonus_max: 20,
            expected_roster_size: 5,
            depth_bonus_max: 15,
            expected_turns: 10,
            agreement_bonus_max: 30,
            early_round_cap: 45,
            early_round_limit: 2,
            middle_round_cap: 65,
            middle_round_limit: 4,
            short_turn_words: 30,
            short_turn_allowance: 2,
            alignment_band: PhaseBand { min_round: 2, min_score: 45 },
            resolution_band: PhaseBand { min_round: 4, min_score: 65 },
            finalization_band: PhaseBand { min_round: 5, min_score: 85 },
            rule_based_confidence: 50,
            ai_assisted_confidence: 80,
            conflict_markers: words(&[
                "however",
                "but",
                "concern",
                "issue",
                "problem",
                "disagree",
                "alternatively",
                "instead",
            ]),
            agreement_markers: words(&[
                "agree",
                "agreed",
                "consensus",
                "aligned",
                "support",
                "supports",
            ]),
        }
    }
}

impl ConsensusTuning {
    /// Whether `token` hits a conflict marker (exact word or its plain plural)
    pub fn is_conflict_token(&self, token: &str) -> bool {
        matches_marker(&self.conflict_markers, token)
    }

    /// Whether `token` hits an agreement marker
    pub fn is_agreement_token(&self, token: &str) -> bool {
        matches_marker(&self.agreement_markers, token)
    }
}

fn matches_marker(markers: &[String], token: &str) -> bool {
    markers.iter().any(|m| {
        token == m
            || token
                .strip_suffix('s')
                .is_some_and(|stem| stem == m.as_str())
    })
}
