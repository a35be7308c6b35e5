//! Context-window policy and token estimates
//!
//! The policy is advisory: the participant adapter decides how much of the
//! transcript to render, using [`partition_transcript`].

use crate::discussion::turn::Turn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Past this round the transcript is progressively summarized
pub const PROGRESSIVE_AFTER_ROUND: u32 = 5;
/// Past this round only the latest round is kept verbatim
pub const AGGRESSIVE_AFTER_ROUND: u32 = 8;

/// Characters per token in the rough estimate
pub const CHARS_PER_TOKEN: usize = 4;
/// Prompt tokens added per speaker on top of the transcript
pub const PROMPT_OVERHEAD_TOKENS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextPolicy {
    #[default]
    Full,
    ProgressiveSummary,
    AggressiveSummary,
}

impl ContextPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextPolicy::Full => "full",
            ContextPolicy::ProgressiveSummary => "progressive_summary",
            ContextPolicy::AggressiveSummary => "aggressive_summary",
        }
    }

    /// Completed rounds, counted back from the latest, kept verbatim.
    /// `None` keeps everything.
    pub fn verbatim_rounds(&self) -> Option<u32> {
        match self {
            ContextPolicy::Full => None,
            ContextPolicy::ProgressiveSummary => Some(2),
            ContextPolicy::AggressiveSummary => Some(1),
        }
    }

    /// Share of the transcript a speaker is expected to receive, as a divisor
    fn transcript_divisor(&self) -> usize {
        match self {
            ContextPolicy::Full => 1,
            ContextPolicy::ProgressiveSummary => 2,
            ContextPolicy::AggressiveSummary => 4,
        }
    }
}

impl fmt::Display for ContextPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn optimize_context(current_round: u32) -> ContextPolicy {
    if current_round > AGGRESSIVE_AFTER_ROUND {
        ContextPolicy::AggressiveSummary
    } else if current_round > PROGRESSIVE_AFTER_ROUND {
        ContextPolicy::ProgressiveSummary
    } else {
        ContextPolicy::Full
    }
}

/// Rough token usage of the transcript and of the next round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEstimate {
    pub transcript_tokens: usize,
    pub projected_next_round: usize,
}

/// Estimate tokens at four characters each.
///
/// Each upcoming speaker is assumed to receive the transcript (reduced by
/// `policy`) plus a fixed prompt overhead.
pub fn estimate_token_usage(
    turns: &[Turn],
    upcoming_speakers: usize,
    policy: ContextPolicy,
) -> TokenEstimate {
    let chars: usize = turns
        .iter()
        .map(|t| t.content.chars().count() + t.speaker_name.chars().count())
        .sum();
    let transcript_tokens = chars.div_ceil(CHARS_PER_TOKEN);
    let per_speaker = transcript_tokens / policy.transcript_divisor() + PROMPT_OVERHEAD_TOKENS;

    TokenEstimate {
        transcript_tokens,
        projected_next_round: per_speaker * upcoming_speakers,
    }
}

/// Transcript split for rendering under a policy
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PartitionedTranscript<'a> {
    /// Earlier turns shown as one line each
    pub summarized: Vec<&'a Turn>,
    /// Recent turns shown in full
    pub verbatim: Vec<&'a Turn>,
    /// Turns left out entirely
    pub omitted: usize,
}

/// Split `turns` according to `policy`.
///
/// Full keeps everything verbatim. ProgressiveSummary keeps the last two
/// rounds verbatim and summarizes the rest. AggressiveSummary keeps the last
/// round verbatim and omits the rest.
pub fn partition_transcript(turns: &[Turn], policy: ContextPolicy) -> PartitionedTranscript<'_> {
    let Some(keep) = policy.verbatim_rounds() else {
        return PartitionedTranscript {
            verbatim: turns.iter().collect(),
            ..Default::default()
        };
    };
    let Some(latest) = turns.iter().map(|t| t.round).max() else {
        return PartitionedTranscript::default();
    };
    let cutoff = latest.saturating_sub(keep);

    let mut parts = PartitionedTranscript::default();
    for turn in turns {
        if turn.round > cutoff {
            parts.verbatim.push(turn);
        } else if policy == ContextPolicy::ProgressiveSummary {
            parts.summarized.push(turn);
        } else {
            parts.omitted += 1;
        }
    }
    parts
}
