//! Workflow state machine types
//!
//! `Phase` is the top-level state variable: `setup → discussion → voting →
//! (discussion | finished)`. `finished` is terminal. The engine owns and
//! exclusively mutates one `WorkflowState` per consultation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level consultation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Discussion,
    Voting,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Discussion => "discussion",
            Phase::Voting => "voting",
            Phase::Finished => "finished",
        }
    }

    /// Human label used in the session index
    pub fn status_text(&self) -> &'static str {
        match self {
            Phase::Setup => "Preparing",
            Phase::Discussion => "In discussion",
            Phase::Voting => "Evaluating",
            Phase::Finished => "Finished",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Turn-queue ordering policy for a discussion round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnOrder {
    /// Uniform shuffle of the active doctors
    #[default]
    Random,
    /// Roster order, filtered to active doctors
    Fixed,
}

/// Mutable workflow state of a single consultation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub phase: Phase,
    pub current_round: u32,
    pub rounds_without_elimination: u32,
    /// Doctor currently taking their turn, if any
    pub active_turn: Option<String>,
    /// Active doctor ids in this round's speaking order
    pub turn_queue: Vec<String>,
    pub paused: bool,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            phase: Phase::Setup,
            current_round: 0,
            rounds_without_elimination: 0,
            active_turn: None,
            turn_queue: Vec::new(),
            paused: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_setup() {
        let state = WorkflowState::default();
        assert_eq!(state.phase, Phase::Setup);
        assert_eq!(state.current_round, 0);
        assert!(state.turn_queue.is_empty());
        assert!(!state.paused);
    }

    #[test]
    fn test_phase_serde_lowercase() {
        assert_eq!(
            serde_json::to_value(Phase::Discussion).unwrap(),
            serde_json::json!("discussion")
        );
        let phase: Phase = serde_json::from_value(serde_json::json!("finished")).unwrap();
        assert_eq!(phase, Phase::Finished);
    }

    #[test]
    fn test_turn_order_default_is_random() {
        assert_eq!(TurnOrder::default(), TurnOrder::Random);
    }

    #[test]
    fn test_status_text() {
        assert_eq!(Phase::Voting.status_text(), "Evaluating");
        assert_eq!(Phase::Finished.status_text(), "Finished");
    }
}
