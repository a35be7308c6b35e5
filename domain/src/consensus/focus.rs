//! Focus lines for the next round

use crate::consensus::metrics::{ConsensusMetrics, DiscussionPhase};

/// Most focus lines handed to the next round
pub const MAX_FOCUS_ITEMS: usize = 4;

/// Most unresolved issues carried into the focus list
const MAX_FOCUS_ISSUES: usize = 3;

pub const CONFLICT_FOCUS: &str = "Resolve conflicting viewpoints between participants";

/// The fixed focus line for each phase
pub fn phase_focus(phase: DiscussionPhase) -> &'static str {
    match phase {
        DiscussionPhase::Exploration => "Explore the problem space and surface key requirements",
        DiscussionPhase::Alignment => "Align on the most promising approach",
        DiscussionPhase::Resolution => "Resolve remaining disagreements and commit to decisions",
        DiscussionPhase::Finalization => "Finalize the decision and confirm the implementation plan",
    }
}

/// Up to three unresolved issues, the conflict line when conflicts exist,
/// then the phase line; never more than four items.
///
/// The phase line is always present: with three issues it takes the place of
/// the conflict line.
pub fn extract_next_round_focus(metrics: &ConsensusMetrics) -> Vec<String> {
    let mut focus: Vec<String> = metrics
        .unresolved_issues
        .iter()
        .take(MAX_FOCUS_ISSUES)
        .cloned()
        .collect();

    if metrics.has_conflicts() {
        focus.push(CONFLICT_FOCUS.to_string());
    }

    focus.truncate(MAX_FOCUS_ITEMS - 1);
    focus.push(phase_focus(metrics.discussion_phase).to_string());
    focus
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn metrics(issues: usize, conflicts: bool, phase: DiscussionPhase) -> ConsensusMetrics {
        let mut positions = BTreeMap::new();
        if conflicts {
            positions.insert("qa".to_string(), vec!["objects".to_string()]);
        }
        ConsensusMetrics::new(
            50,
            (1..=issues).map(|i| format!("issue {i}")).collect(),
            positions,
            50,
            phase,
        )
    }

    #[test]
    fn test_issues_then_phase_line() {
        let focus = extract_next_round_focus(&metrics(2, false, DiscussionPhase::Alignment));
        assert_eq!(
            focus,
            vec!["issue 1", "issue 2", phase_focus(DiscussionPhase::Alignment)]
        );
    }

    #[test]
    fn test_capped_at_four_and_keeps_phase_line() {
        let focus = extract_next_round_focus(&metrics(5, true, DiscussionPhase::Resolution));
        assert_eq!(focus.len(), MAX_FOCUS_ITEMS);
        assert_eq!(focus[..3], ["issue 1", "issue 2", "issue 3"]);
        assert_eq!(focus[3], phase_focus(DiscussionPhase::Resolution));
        assert!(!focus.iter().any(|f| f == CONFLICT_FOCUS));

        // three issues plus a conflict: the conflict line yields to the phase line
        let focus = extract_next_round_focus(&metrics(3, true, DiscussionPhase::Alignment));
        assert_eq!(
            focus,
            vec![
                "issue 1",
                "issue 2",
                "issue 3",
                phase_focus(DiscussionPhase::Alignment)
            ]
        );
        assert!(!focus.iter().any(|f| f == CONFLICT_FOCUS));
    }

    #[test]
    fn test_conflict_line_when_room() {
        let focus = extract_next_round_focus(&metrics(1, true, DiscussionPhase::Exploration));
        assert_eq!(
            focus,
            vec![
                "issue 1",
                CONFLICT_FOCUS,
                phase_focus(DiscussionPhase::Exploration)
            ]
        );
    }

    #[test]
    fn test_every_phase_line_present() {
        for phase in DiscussionPhase::ALL {
            let focus = extract_next_round_focus(&metrics(0, false, phase));
            assert_eq!(focus, vec![phase_focus(phase)]);
        }
    }
}
