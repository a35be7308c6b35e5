//! Turns and the append-only transcript

use crate::discussion::role::RoleId;
use serde::{Deserialize, Serialize};

/// One participant's contribution in a given round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Round the turn belongs to (1-indexed)
    pub round: u32,
    /// Display name of the speaker
    pub speaker_name: String,
    /// Stable role identifier of the speaker
    pub role: RoleId,
    /// What was said
    pub content: String,
}

impl Turn {
    pub fn new(
        round: u32,
        speaker_name: impl Into<String>,
        role: impl Into<RoleId>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            round,
            speaker_name: speaker_name.into(),
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Ordered list of turns. Turns are only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Turns spoken in round `round`, in speaking order
    pub fn round(&self, round: u32) -> Vec<&Turn> {
        self.turns.iter().filter(|t| t.round == round).collect()
    }

    /// Every turn spoken up to and including round `round`.
    ///
    /// Turns are pushed round by round, so this is always a prefix.
    pub fn through_round(&self, round: u32) -> &[Turn] {
        let end = self.turns.partition_point(|t| t.round <= round);
        &self.turns[..end]
    }

    /// Highest round number present in the transcript
    pub fn last_completed_round(&self) -> Option<u32> {
        self.turns.iter().map(|t| t.round).max()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }
}

impl From<Vec<Turn>> for Transcript {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}
