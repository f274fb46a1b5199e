//! Turn lifecycle with validated transitions.
//!
//! Idle -> Classifying -> SmallTalk | Searching -> Replying -> Idle
//! Idle -> Greeting -> Idle

use serde::Serialize;

use crate::error::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Idle,
    Classifying,
    SmallTalk,
    Searching,
    Replying,
    Greeting,
}

/// Validate that a phase transition is allowed.
///
/// Besides the main path, a turn may return to `Idle` straight from
/// `Classifying` (nothing to answer) or `Searching` (client went away).
pub fn validate_transition(from: TurnPhase, to: TurnPhase) -> Result<(), ChatError> {
    use TurnPhase::*;

    let valid = matches!(
        (from, to),
        (Idle, Classifying)
            | (Idle, Greeting)
            | (Greeting, Idle)
            | (Classifying, SmallTalk)
            | (Classifying, Searching)
            | (Classifying, Idle)
            | (SmallTalk, Replying)
            | (Searching, Replying)
            | (Searching, Idle)
            | (Replying, Idle)
    );

    if valid {
        Ok(())
    } else {
        Err(ChatError::InvalidTransition { from, to })
    }
}

/// Tracks the phase of a single turn.
#[derive(Debug)]
pub struct PhaseTracker {
    turn_id: String,
    phase: TurnPhase,
}

impl PhaseTracker {
    pub fn new(turn_id: impl Into<String>) -> Self {
        Self {
            turn_id: turn_id.into(),
            phase: TurnPhase::Idle,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn advance(&mut self, to: TurnPhase) -> Result<(), ChatError> {
        validate_transition(self.phase, to)?;
        tracing::trace!(turn = %self.turn_id, from = ?self.phase, ?to, "Turn phase");
        self.phase = to;
        Ok(())
    }
}
