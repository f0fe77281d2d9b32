//! Import attempt state machine
//!
//! An attempt progresses through the pipeline stages in order and ends in
//! exactly one terminal state: SUCCEEDED, FAILED(stage) or CANCELLED.

use chrono::{DateTime, Utc};
use cimp_common::events::{ImportStage, ImportState, StateTransition};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// One import attempt (in-memory, discarded after the call)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportAttempt {
    /// Unique attempt identifier
    pub attempt_id: Uuid,

    /// Current state
    pub state: ImportState,

    /// Every transition taken, in order
    pub transitions: Vec<StateTransition>,

    /// Attempt start time
    pub started_at: DateTime<Utc>,

    /// Attempt end time (set on terminal states)
    pub ended_at: Option<DateTime<Utc>>,
}

impl ImportAttempt {
    /// Create new attempt in IDLE
    pub fn new() -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            state: ImportState::Idle,
            transitions: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to new state
    ///
    /// Only forward moves are legal; anything else is a programming error and
    /// is logged (and asserted in debug builds).
    pub fn transition_to(&mut self, new_state: ImportState) -> StateTransition {
        if !self.state.can_transition_to(new_state) {
            warn!(
                "Illegal import state transition {} -> {} (attempt {})",
                self.state, new_state, self.attempt_id
            );
            debug_assert!(false, "illegal transition {} -> {}", self.state, new_state);
        }

        let transition = StateTransition {
            attempt_id: self.attempt_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        if new_state.is_terminal() {
            self.ended_at = Some(transition.transitioned_at);
        }

        self.transitions.push(transition.clone());
        transition
    }

    /// Enter a working stage
    pub fn enter(&mut self, stage: ImportStage) -> StateTransition {
        self.transition_to(ImportState::Running(stage))
    }

    /// Stage currently being worked, if running
    pub fn current_stage(&self) -> Option<ImportStage> {
        match self.state {
            ImportState::Running(stage) => Some(stage),
            _ => None,
        }
    }

    /// Check if attempt is terminal (finished)
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Stages entered so far, in order
    pub fn stages_visited(&self) -> Vec<ImportStage> {
        self.transitions
            .iter()
            .filter_map(|transition| match transition.new_state {
                ImportState::Running(stage) => Some(stage),
                _ => None,
            })
            .collect()
    }
}

impl Default for ImportAttempt {
    fn default() -> Self {
        Self::new()
    }
}
