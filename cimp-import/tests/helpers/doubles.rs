//! Recording collaborators
//!
//! In-memory stand-ins for the document store, reporter and source that record
//! every call so tests can assert on exactly what the pipeline did.

use async_trait::async_trait;
use cimp_import::decoder::DecodeError;
use cimp_import::reporter::error_chain;
use cimp_import::{
    ActorPayload, DocumentStore, EntityHandle, ItemRecord, OutcomeReporter, SourceAcquisition,
    SourceDocument, StoreError,
};
use serde_json::{json, Value};
use std::error::Error as StdError;
use std::path::PathBuf;
use std::sync::Mutex;

/// Scenario A input
pub fn character_fixture() -> Value {
    json!({
        "name": "Urgath",
        "type": "character",
        "img": "icons/urgath.png",
        "system": {"attributes": {"hp": {"value": 12, "max": 12}}},
        "items": [
            {"name": "Bronze Sword", "type": "weapon", "system": {"damage": "1d6"}}
        ]
    })
}

/// One store request, in call order
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    CreateEntity(Value),
    CreateChildEntities { items: Vec<Value>, parent: EntityHandle },
}

/// How the store answers `create_entity`
#[derive(Debug, Clone)]
pub enum ActorBehaviour {
    Accept,
    Reject,
    NoIdentity,
    BlankIdentity,
}

/// How the store answers `create_child_entities`
#[derive(Debug, Clone)]
pub enum ItemBehaviour {
    Accept,
    Reject,
    /// Confirm only the first `n` items
    ConfirmOnly(usize),
}

/// Store that records calls and answers as configured
pub struct RecordingStore {
    calls: Mutex<Vec<StoreCall>>,
    actor: ActorBehaviour,
    items: ItemBehaviour,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::with_behaviour(ActorBehaviour::Accept, ItemBehaviour::Accept)
    }

    pub fn with_behaviour(actor: ActorBehaviour, items: ItemBehaviour) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            actor,
            items,
        }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn child_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, StoreCall::CreateChildEntities { .. }))
            .count()
    }
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn create_entity(
        &self,
        payload: &ActorPayload,
    ) -> Result<Option<EntityHandle>, StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::CreateEntity(payload.to_value()));

        match self.actor {
            ActorBehaviour::Accept => Ok(Some(EntityHandle::new("actor-1", payload.name.trim()))),
            ActorBehaviour::Reject => Err(StoreError::Rejected("permission denied".to_string())),
            ActorBehaviour::NoIdentity => Ok(None),
            ActorBehaviour::BlankIdentity => Ok(Some(EntityHandle::new("", payload.name.clone()))),
        }
    }

    async fn create_child_entities(
        &self,
        payloads: &[ItemRecord],
        parent: &EntityHandle,
    ) -> Result<Vec<EntityHandle>, StoreError> {
        self.calls.lock().unwrap().push(StoreCall::CreateChildEntities {
            items: payloads.iter().map(|item| item.0.clone()).collect(),
            parent: parent.clone(),
        });

        let handles = payloads
            .iter()
            .enumerate()
            .map(|(i, item)| {
                EntityHandle::new(format!("item-{}", i + 1), item.name().unwrap_or(""))
            })
            .collect::<Vec<_>>();

        match self.items {
            ItemBehaviour::Accept => Ok(handles),
            ItemBehaviour::Reject => Err(StoreError::Rejected("quota exceeded".to_string())),
            ItemBehaviour::ConfirmOnly(n) => Ok(handles.into_iter().take(n).collect()),
        }
    }
}

/// Reporter that keeps every notification and log entry
#[derive(Default)]
pub struct RecordingReporter {
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    logs: Mutex<Vec<(String, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    /// `(context, rendered cause chain)` pairs
    pub fn logs(&self) -> Vec<(String, String)> {
        self.logs.lock().unwrap().clone()
    }
}

impl OutcomeReporter for RecordingReporter {
    fn notify_info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn notify_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn log_error(&self, context: &str, cause: &(dyn StdError + 'static)) {
        self.logs
            .lock()
            .unwrap()
            .push((context.to_string(), error_chain(cause)));
    }
}

/// Source returning a fixed answer
pub enum ScriptedSource {
    Document(Vec<u8>),
    Cancel,
    Unreadable,
}

impl ScriptedSource {
    pub fn json(value: &Value) -> Self {
        ScriptedSource::Document(serde_json::to_vec(value).unwrap())
    }

    pub fn text(text: &str) -> Self {
        ScriptedSource::Document(text.as_bytes().to_vec())
    }
}

#[async_trait]
impl SourceAcquisition for ScriptedSource {
    async fn acquire(&self) -> Result<Option<SourceDocument>, DecodeError> {
        match self {
            ScriptedSource::Document(bytes) => {
                Ok(Some(SourceDocument::new("fixture.json", bytes.clone())))
            }
            ScriptedSource::Cancel => Ok(None),
            ScriptedSource::Unreadable => Err(DecodeError::Read {
                path: PathBuf::from("fixture.json"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
            }),
        }
    }
}
