//! Prompt templates for participants and the consensus scorer

use crate::consensus::metrics::ConsensusMetrics;
use crate::core::string::{sentences, truncate};
use crate::discussion::role::RoleSpec;
use crate::discussion::turn::Turn;
use crate::strategy::context::{ContextPolicy, partition_transcript};

/// Longest excerpt used for a summarized turn
const SUMMARY_LINE_BYTES: usize = 160;

/// Fallback subject of the forced-agreement directive
const DEFAULT_AGREEMENT_SUBJECT: &str = "a final recommendation for the topic";

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for one participant role
    pub fn participant_system(role: &RoleSpec) -> String {
        let stance = if role.is_moderator {
            "You do not advocate a solution of your own. Summarize where the group agrees, \
name the open disagreements precisely and propose a concrete way to settle each one."
        } else if role.is_decision_maker {
            "You own the final decision. Weigh the other experts' input against user value \
and scope, and state clearly which direction you favour."
        } else {
            "Argue from your area of expertise. Say plainly when you agree with a colleague \
and when you do not, and give your reasons."
        };

        format!(
            r#"You are the {name} in a roundtable discussion between experts.
Your expertise: {expertise}.

{stance}

Keep each contribution focused and under 250 words. Do not repeat points that were already made unless you are changing your position."#,
            name = role.display_name,
            expertise = role.expertise,
            stance = stance,
        )
    }

    /// User prompt asking a participant for its turn in `round`
    pub fn turn_prompt(
        topic: &str,
        round: u32,
        turns: &[Turn],
        focus: &[String],
        directive: Option<&str>,
        policy: ContextPolicy,
    ) -> String {
        let mut prompt = format!("Discussion topic: {}\n\nThis is round {}.\n", topic, round);

        if turns.is_empty() {
            prompt.push_str("\nNobody has spoken yet. Open with your initial position.\n");
        } else {
            prompt.push_str("\nDiscussion so far:\n");
            prompt.push_str(&Self::render_transcript(turns, policy));
        }

        if !focus.is_empty() {
            prompt.push_str("\nFocus for this round:\n");
            for item in focus {
                prompt.push_str(&format!("- {}\n", item));
            }
        }

        if let Some(directive) = directive {
            prompt.push_str(&format!("\n{}\n", directive));
        }

        prompt.push_str("\nGive your contribution for this round.");
        prompt
    }

    /// Transcript text as the participant sees it under `policy`
    pub fn render_transcript(turns: &[Turn], policy: ContextPolicy) -> String {
        let parts = partition_transcript(turns, policy);
        let mut out = String::new();

        if parts.omitted > 0 {
            out.push_str(&format!(
                "({} earlier contributions omitted)\n",
                parts.omitted
            ));
        }

        if !parts.summarized.is_empty() {
            out.push_str("Earlier rounds (summary):\n");
            for turn in &parts.summarized {
                let gist = sentences(&turn.content)
                    .first()
                    .map(|s| truncate(s, SUMMARY_LINE_BYTES))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "- [Round {}] {}: {}\n",
                    turn.round, turn.speaker_name, gist
                ));
            }
        }

        let mut current = None;
        for turn in &parts.verbatim {
            if current != Some(turn.round) {
                out.push_str(&format!("\n## Round {}\n", turn.round));
                current = Some(turn.round);
            }
            out.push_str(&format!(
                "\n--- {} ---\n{}\n",
                turn.speaker_name,
                turn.content.trim()
            ));
        }
        out
    }

    /// Directive appended to every prompt of the forced final round
    pub fn forced_agreement_directive(metrics: &ConsensusMetrics) -> String {
        let subject = if metrics.unresolved_issues.is_empty() {
            DEFAULT_AGREEMENT_SUBJECT.to_string()
        } else {
            metrics.unresolved_issues.join("; ")
        };
        format!(
            "This is the final round. You must reach agreement on: {}. \
State the option you can accept and any condition attached to it.",
            subject
        )
    }

    /// System prompt for the consensus scorer
    pub fn consensus_analysis_system() -> &'static str {
        r#"You are a neutral analyst measuring how close a group of experts is to agreement.
You never take part in the discussion. You answer with a single JSON object and nothing else."#
    }

    /// Scorer prompt for the transcript up to and including `current_round`
    pub fn consensus_analysis(turns: &[Turn], current_round: u32) -> String {
        let mut prompt = format!(
            "Analyze the discussion below as it stands after round {}. Weigh the latest round most.\n\nContributions:\n",
            current_round
        );

        for turn in turns {
            prompt.push_str(&format!(
                "\n--- Round {}: {} ({}) ---\n{}\n",
                turn.round,
                turn.speaker_name,
                turn.role,
                turn.content.trim()
            ));
        }

        prompt.push_str(
            r#"
Respond with a JSON object with exactly these fields:
{
  "agreementScore": <integer 0-100, how far the participants agree>,
  "unresolvedIssues": [<short description of each open issue>],
  "conflictingPositions": {"<role id>": [<positions this role holds against the others>]},
  "confidenceLevel": <integer 0-100, how confident you are in this assessment>,
  "discussionPhase": "exploration" | "alignment" | "resolution" | "finalization"
}

Use the role ids shown in parentheses as keys of conflictingPositions. Leave it empty when nobody disagrees."#,
        );

        prompt
    }
}
