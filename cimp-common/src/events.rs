//! Import state machine types and event distribution
//!
//! One import attempt moves strictly forward:
//! `Idle → Decoding → Validating → Migrating → Splitting → CreatingActor →
//! CreatingItems → {Succeeded | Failed(stage)}`.
//! `Cancelled` is only reachable from `Idle`, when the source yields nothing.
//!
//! Events are distributed over a `tokio::sync::broadcast` channel. Emitting
//! with no subscribers is allowed; the event is simply dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Working stage of an import attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    /// Parsing bytes into a JSON value
    Decoding,
    /// Checking required top-level fields
    Validating,
    /// Normalizing older record shapes
    Migrating,
    /// Separating actor payload from items
    Splitting,
    /// Waiting on the store to create the actor
    CreatingActor,
    /// Waiting on the store to create the actor's items
    CreatingItems,
}

impl ImportStage {
    /// All stages in execution order
    pub const ALL: [ImportStage; 6] = [
        ImportStage::Decoding,
        ImportStage::Validating,
        ImportStage::Migrating,
        ImportStage::Splitting,
        ImportStage::CreatingActor,
        ImportStage::CreatingItems,
    ];

    /// Stage that follows this one, if any
    pub fn next(self) -> Option<ImportStage> {
        match self {
            ImportStage::Decoding => Some(ImportStage::Validating),
            ImportStage::Validating => Some(ImportStage::Migrating),
            ImportStage::Migrating => Some(ImportStage::Splitting),
            ImportStage::Splitting => Some(ImportStage::CreatingActor),
            ImportStage::CreatingActor => Some(ImportStage::CreatingItems),
            ImportStage::CreatingItems => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImportStage::Decoding => "decoding",
            ImportStage::Validating => "validating",
            ImportStage::Migrating => "migrating",
            ImportStage::Splitting => "splitting",
            ImportStage::CreatingActor => "creating_actor",
            ImportStage::CreatingItems => "creating_items",
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one import attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum ImportState {
    /// Nothing acquired yet
    Idle,
    /// Working through a stage
    Running(ImportStage),
    /// Actor and all items persisted
    Succeeded,
    /// Terminated in the given stage
    Failed(ImportStage),
    /// Source yielded nothing
    Cancelled,
}

impl ImportState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ImportState::Succeeded | ImportState::Failed(_) | ImportState::Cancelled
        )
    }

    /// Whether moving from `self` to `next` is a legal forward transition
    pub fn can_transition_to(self, next: ImportState) -> bool {
        match (self, next) {
            (ImportState::Idle, ImportState::Running(ImportStage::Decoding)) => true,
            (ImportState::Idle, ImportState::Cancelled) => true,
            (ImportState::Running(current), ImportState::Running(stage)) => {
                current.next() == Some(stage)
            }
            (ImportState::Running(current), ImportState::Failed(stage)) => current == stage,
            (ImportState::Running(ImportStage::CreatingItems), ImportState::Succeeded) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportState::Idle => f.write_str("idle"),
            ImportState::Running(stage) => write!(f, "{}", stage),
            ImportState::Succeeded => f.write_str("succeeded"),
            ImportState::Failed(stage) => write!(f, "failed({})", stage),
            ImportState::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Recorded state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub attempt_id: Uuid,
    pub old_state: ImportState,
    pub new_state: ImportState,
    pub transitioned_at: DateTime<Utc>,
}

/// Import progress events for subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImportEvent {
    /// Attempt moved to a new state
    StateChanged {
        attempt_id: Uuid,
        old_state: ImportState,
        new_state: ImportState,
        timestamp: DateTime<Utc>,
    },

    /// Actor and items persisted
    Completed {
        attempt_id: Uuid,
        /// Store identity of the created actor
        actor_id: String,
        /// Name as resolved by the store
        actor_name: String,
        items_created: usize,
        timestamp: DateTime<Utc>,
    },

    /// Attempt terminated with an error
    Failed {
        attempt_id: Uuid,
        stage: ImportStage,
        /// Error message (not localized)
        message: String,
        /// Set when the actor was persisted before the failure
        actor_id: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// Source yielded nothing
    Cancelled {
        attempt_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl ImportEvent {
    pub fn attempt_id(&self) -> Uuid {
        match self {
            ImportEvent::StateChanged { attempt_id, .. }
            | ImportEvent::Completed { attempt_id, .. }
            | ImportEvent::Failed { attempt_id, .. }
            | ImportEvent::Cancelled { attempt_id, .. } => *attempt_id,
        }
    }
}

impl From<&StateTransition> for ImportEvent {
    fn from(transition: &StateTransition) -> Self {
        ImportEvent::StateChanged {
            attempt_id: transition.attempt_id,
            old_state: transition.old_state,
            new_state: transition.new_state,
            timestamp: transition.transitioned_at,
        }
    }
}

/// Broadcast bus for import events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ImportEvent>,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ImportEvent> {
        self.tx.subscribe()
    }

    /// Emit an event; `Err` when nobody is listening
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ImportEvent,
    ) -> Result<usize, broadcast::error::SendError<ImportEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the absence of subscribers
    pub fn emit_lossy(&self, event: ImportEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("No subscribers for import event");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
