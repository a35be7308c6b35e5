//! Rule-based consensus heuristic
//!
//! Deterministic lexical scoring used whenever the AI-assisted evaluation is
//! unavailable. It is intentionally simple: it counts who spoke, how much was
//! said and which marker words appear. It does not understand the content.

use crate::consensus::metrics::{ConsensusMetrics, DiscussionPhase};
use crate::consensus::tuning::{
    CLARIFICATION_ISSUE, CONFLICT_PLACEHOLDER, ConsensusTuning, EARLY_ROUND_ISSUES,
};
use crate::core::string::{tokens, word_count};
use crate::discussion::turn::Turn;
use std::collections::{BTreeMap, BTreeSet};

/// Score `turns` (the transcript through `current_round`) without any
/// external help.
///
/// # Example
///
/// ```
/// use roundtable_domain::consensus::{generate_rule_based_consensus, ConsensusTuning, DiscussionPhase};
///
/// let metrics = generate_rule_based_consensus(&[], 1, &ConsensusTuning::default());
/// assert_eq!(metrics.agreement_score, 20);
/// assert_eq!(metrics.unresolved_issues.len(), 2);
/// assert_eq!(metrics.discussion_phase, DiscussionPhase::Exploration);
/// ```
pub fn generate_rule_based_consensus(
    turns: &[Turn],
    current_round: u32,
    tuning: &ConsensusTuning,
) -> ConsensusMetrics {
    let score = rule_based_score(turns, current_round, tuning);

    let mut unresolved_issues = Vec::new();
    let thin_turns = turns
        .iter()
        .filter(|t| word_count(&t.content) < tuning.short_turn_words)
        .count();
    if thin_turns > tuning.short_turn_allowance {
        unresolved_issues.push(CLARIFICATION_ISSUE.to_string());
    }
    if current_round <= tuning.early_round_limit {
        unresolved_issues.extend(EARLY_ROUND_ISSUES.iter().map(|s| s.to_string()));
    }

    ConsensusMetrics::new(
        i64::from(score),
        unresolved_issues,
        detect_conflicts(turns, tuning),
        i64::from(tuning.rule_based_confidence),
        derive_phase(current_round, score, tuning),
    )
}

/// Base score plus participation, depth and agreement bonuses, then the
/// round ceiling.
pub fn rule_based_score(turns: &[Turn], current_round: u32, tuning: &ConsensusTuning) -> u32 {
    let roles: BTreeSet<&str> = turns.iter().map(|t| t.role.as_str()).collect();

    let participation = proportional_bonus(
        roles.len(),
        tuning.expected_roster_size,
        tuning.participation_bonus_max,
    );
    let depth = proportional_bonus(turns.len(), tuning.expected_turns, tuning.depth_bonus_max);
    let agreeing = turns
        .iter()
        .filter(|t| has_agreement_marker(&t.content, tuning))
        .count();
    let agreement = proportional_bonus(agreeing, turns.len(), tuning.agreement_bonus_max);

    let total = (tuning.base_score + participation + depth + agreement).min(100);

    if current_round <= tuning.early_round_limit {
        total.min(tuning.early_round_cap)
    } else if current_round <= tuning.middle_round_limit {
        total.min(tuning.middle_round_cap)
    } else {
        total
    }
}

/// `max * min(count / expected, 1)`, rounded. Zero when nothing is expected.
fn proportional_bonus(count: usize, expected: usize, max: u32) -> u32 {
    if expected == 0 {
        return 0;
    }
    let ratio = count.min(expected) as f64 / expected as f64;
    (ratio * f64::from(max)).round() as u32
}

/// Every role with at least one turn containing a conflict marker, each with
/// a single placeholder description.
pub fn detect_conflicts(turns: &[Turn], tuning: &ConsensusTuning) -> BTreeMap<String, Vec<String>> {
    let mut positions = BTreeMap::new();
    for turn in turns {
        if has_conflict_marker(&turn.content, tuning) {
            positions
                .entry(turn.role.as_str().to_string())
                .or_insert_with(|| vec![CONFLICT_PLACEHOLDER.to_string()]);
        }
    }
    positions
}

pub fn has_conflict_marker(text: &str, tuning: &ConsensusTuning) -> bool {
    tokens(text).any(|t| tuning.is_conflict_token(&t))
}

pub fn has_agreement_marker(text: &str, tuning: &ConsensusTuning) -> bool {
    tokens(text).any(|t| tuning.is_agreement_token(&t))
}

/// Phase from round number and score; both moving up can only move the phase
/// forward.
pub fn derive_phase(current_round: u32, score: u32, tuning: &ConsensusTuning) -> DiscussionPhase {
    let reaches = |band: &crate::consensus::tuning::PhaseBand| {
        current_round >= band.min_round && score >= band.min_score
    };

    if reaches(&tuning.finalization_band) {
        DiscussionPhase::Finalization
    } else if reaches(&tuning.resolution_band) {
        DiscussionPhase::Resolution
    } else if reaches(&tuning.alignment_band) {
        DiscussionPhase::Alignment
    } else {
        DiscussionPhase::Exploration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discussion::role::RoleRoster;

    const LONG_AGREEMENT: &str = "I agree with the layered approach that was proposed, and \
        the plan to keep the service stateless behind the gateway looks right to me. We \
        should document the deployment steps, add metrics for the queue depth and move on \
        to sequencing the work for the first milestone next week.";

    fn tuning() -> ConsensusTuning {
        ConsensusTuning::default()
    }

    fn full_round(round: u32, content: &str) -> Vec<Turn> {
        let roster = RoleRoster::default();
        roster
            .roles()
            .iter()
            .flat_map(|r| {
                [
                    Turn::new(round, &r.display_name, r.id.clone(), content),
                    Turn::new(round, &r.display_name, r.id.clone(), content),
                ]
            })
            .collect()
    }

    #[test]
    fn test_empty_transcript_round_one() {
        let metrics = generate_rule_based_consensus(&[], 1, &tuning());
        assert!((20..=45).contains(&metrics.agreement_score));
        assert!(metrics.unresolved_issues.len() >= 2);
        assert_eq!(metrics.discussion_phase, DiscussionPhase::Exploration);
        assert_eq!(metrics.confidence_level, 50);
    }

    #[test]
    fn test_full_agreeing_round_five_reaches_top_band() {
        let turns = full_round(5, LONG_AGREEMENT);
        let metrics = generate_rule_based_consensus(&turns, 5, &tuning());
        assert_eq!(metrics.agreement_score, 85);
        assert!(metrics.conflicting_positions.is_empty());
        assert!(metrics.unresolved_issues.is_empty());
        assert_eq!(metrics.discussion_phase, DiscussionPhase::Finalization);
    }

    #[test]
    fn test_round_ceilings() {
        let tuning = tuning();
        assert_eq!(rule_based_score(&full_round(2, LONG_AGREEMENT), 2, &tuning), 45);
        assert_eq!(rule_based_score(&full_round(4, LONG_AGREEMENT), 4, &tuning), 65);
    }

    #[test]
    fn test_conflict_markers_record_role_once() {
        let turns = vec![
            Turn::new(3, "Architect", "architect", "However, I disagree with the queue."),
            Turn::new(3, "Architect", "architect", "But there is another problem."),
            Turn::new(3, "QA Engineer", "qa", "Looks fine to me."),
        ];
        let conflicts = detect_conflicts(&turns, &tuning());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts["architect"], vec![CONFLICT_PLACEHOLDER.to_string()]);
    }

    #[test]
    fn test_thin_turns_seed_clarification_issue() {
        let turns: Vec<Turn> = (0..3)
            .map(|_| Turn::new(3, "Developer", "developer", "Sounds fine."))
            .collect();
        let metrics = generate_rule_based_consensus(&turns, 3, &tuning());
        assert_eq!(metrics.unresolved_issues, vec![CLARIFICATION_ISSUE.to_string()]);

        let two: Vec<Turn> = turns.into_iter().take(2).collect();
        let metrics = generate_rule_based_consensus(&two, 3, &tuning());
        assert!(metrics.unresolved_issues.is_empty());
    }

    #[test]
    fn test_phase_is_monotonic() {
        let tuning = tuning();
        let rank = |round, score| {
            DiscussionPhase::ALL
                .iter()
                .position(|p| *p == derive_phase(round, score, &tuning))
        };
        for round in 1..=8 {
            for score in (0..=95).step_by(5) {
                assert!(rank(round, score + 5) >= rank(round, score));
                assert!(rank(round + 1, score) >= rank(round, score));
            }
        }
        assert_eq!(derive_phase(2, 45, &tuning), DiscussionPhase::Alignment);
        assert_eq!(derive_phase(1, 100, &tuning), DiscussionPhase::Exploration);
    }

    #[test]
    fn test_disagree_does_not_earn_agreement_bonus() {
        let tuning = tuning();
        assert!(!has_agreement_marker("I disagree entirely", &tuning));
        assert!(has_agreement_marker("We are aligned.", &tuning));
    }
}
