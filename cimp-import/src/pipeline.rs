//! Import pipeline orchestrator
//!
//! Runs one import attempt end to end:
//! - **Acquire**: ask the source for a document (the only cancellation point)
//! - **Decode** → **Validate** → **Migrate** → **Split**: pure, in-memory stages
//! - **Create actor** → **Create items**: the two store phases
//!
//! # Error Handling
//! - Every `ImportError` is caught here and never escapes `run_import`
//! - Each failure produces exactly one error notification and one diagnostic log entry
//! - Nothing is retried; an item-phase failure leaves the actor persisted
//!
//! # Example
//! ```rust,ignore
//! let messages = Messages::english("character-import");
//! let pipeline = ImportPipeline::new(source, store, reporter, messages);
//! match pipeline.run_import().await {
//!     ImportOutcome::Succeeded { actor, .. } => println!("created {}", actor.id),
//!     other => println!("{:?}", other),
//! }
//! ```

use crate::compat::migrate;
use crate::decoder::decode_bytes;
use crate::error::{ImportError, ImportResult};
use crate::models::ImportAttempt;
use crate::persist::{create_actor, create_items, ActorCreationError};
use crate::record::EntityHandle;
use crate::reporter::OutcomeReporter;
use crate::source::{SourceAcquisition, SourceDocument};
use crate::splitter::split;
use crate::store::DocumentStore;
use crate::validator::validate;
use chrono::Utc;
use cimp_common::events::{EventBus, ImportEvent, ImportStage, ImportState};
use cimp_common::i18n::{self, Messages};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Final result of one attempt
#[derive(Debug)]
pub enum ImportOutcome {
    /// Source yielded nothing; no work was done
    Cancelled,
    /// Actor and every item persisted
    Succeeded {
        actor: EntityHandle,
        items: Vec<EntityHandle>,
    },
    /// Attempt terminated in `stage`
    Failed { stage: ImportStage, error: ImportError },
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Succeeded { .. })
    }

    /// Actor persisted by this attempt, whether or not it fully succeeded
    pub fn persisted_actor(&self) -> Option<&EntityHandle> {
        match self {
            ImportOutcome::Succeeded { actor, .. } => Some(actor),
            ImportOutcome::Failed { error, .. } => error.persisted_actor(),
            ImportOutcome::Cancelled => None,
        }
    }

    /// Failed after the actor was persisted
    pub fn is_partial(&self) -> bool {
        matches!(self, ImportOutcome::Failed { .. }) && self.persisted_actor().is_some()
    }
}

/// Import pipeline bound to its collaborators
pub struct ImportPipeline {
    source: Arc<dyn SourceAcquisition>,
    store: Arc<dyn DocumentStore>,
    reporter: Arc<dyn OutcomeReporter>,
    messages: Messages,
    event_tx: Option<EventBus>,
}

impl ImportPipeline {
    /// Create new pipeline
    pub fn new(
        source: Arc<dyn SourceAcquisition>,
        store: Arc<dyn DocumentStore>,
        reporter: Arc<dyn OutcomeReporter>,
        messages: Messages,
    ) -> Self {
        Self {
            source,
            store,
            reporter,
            messages,
            event_tx: None,
        }
    }

    /// Broadcast state transitions and outcomes on `event_bus`
    pub fn with_events(mut self, event_bus: EventBus) -> Self {
        self.event_tx = Some(event_bus);
        self
    }

    /// Zero-argument callback for a host UI action
    ///
    /// Each call spawns an independent attempt on the current tokio runtime.
    /// Concurrent calls are not coordinated.
    pub fn into_trigger(
        self: Arc<Self>,
    ) -> impl Fn() -> tokio::task::JoinHandle<ImportOutcome> + Send + Sync + 'static {
        move || {
            let pipeline = Arc::clone(&self);
            tokio::spawn(async move { pipeline.run_import().await })
        }
    }

    /// Run one import attempt
    pub async fn run_import(&self) -> ImportOutcome {
        let mut attempt = ImportAttempt::new();
        debug!("Import attempt {} started", attempt.attempt_id);

        let document = match self.source.acquire().await {
            Ok(Some(document)) => document,
            Ok(None) => {
                info!("Import cancelled: no document chosen");
                self.transition(&mut attempt, ImportState::Cancelled);
                self.emit(ImportEvent::Cancelled {
                    attempt_id: attempt.attempt_id,
                    timestamp: Utc::now(),
                });
                return ImportOutcome::Cancelled;
            }
            Err(err) => {
                self.advance(&mut attempt, ImportStage::Decoding);
                return self.fail(&mut attempt, err.into());
            }
        };

        info!("Importing {} ({} bytes)", document.origin, document.bytes.len());
        self.reporter
            .notify_info(&self.messages.format(i18n::IMPORT_STARTED, &[]));

        match self.execute(&mut attempt, &document).await {
            Ok((actor, items)) => self.succeed(&mut attempt, actor, items),
            Err(err) => self.fail(&mut attempt, err),
        }
    }

    async fn execute(
        &self,
        attempt: &mut ImportAttempt,
        document: &SourceDocument,
    ) -> ImportResult<(EntityHandle, Vec<EntityHandle>)> {
        self.advance(attempt, ImportStage::Decoding);
        let value = decode_bytes(&document.bytes)?;

        self.advance(attempt, ImportStage::Validating);
        let record = validate(value)?;

        self.advance(attempt, ImportStage::Migrating);
        let record = migrate(record)?;

        self.advance(attempt, ImportStage::Splitting);
        let (payload, items) = split(record);
        debug!("Split '{}' into actor payload and {} items", payload.name, items.len());

        self.advance(attempt, ImportStage::CreatingActor);
        let actor = create_actor(self.store.as_ref(), &payload).await?;

        self.advance(attempt, ImportStage::CreatingItems);
        let created = create_items(self.store.as_ref(), &items, &actor).await?;

        Ok((actor, created))
    }

    fn succeed(
        &self,
        attempt: &mut ImportAttempt,
        actor: EntityHandle,
        items: Vec<EntityHandle>,
    ) -> ImportOutcome {
        self.transition(attempt, ImportState::Succeeded);
        info!(
            "Import succeeded: actor '{}' ({}) with {} items",
            actor.name,
            actor.id,
            items.len()
        );

        self.reporter.notify_info(
            &self
                .messages
                .format(i18n::IMPORT_SUCCEEDED, &[("name", actor.name.as_str())]),
        );
        self.emit(ImportEvent::Completed {
            attempt_id: attempt.attempt_id,
            actor_id: actor.id.clone(),
            actor_name: actor.name.clone(),
            items_created: items.len(),
            timestamp: Utc::now(),
        });

        ImportOutcome::Succeeded { actor, items }
    }

    fn fail(&self, attempt: &mut ImportAttempt, error: ImportError) -> ImportOutcome {
        let stage = error.stage();
        self.transition(attempt, ImportState::Failed(stage));

        if let Some(actor) = error.persisted_actor() {
            warn!(
                "Actor '{}' ({}) remains persisted without its items",
                actor.name, actor.id
            );
        }

        self.reporter.notify_error(&self.user_message(&error));
        let context = format!("{}: import failed during {}", self.messages.module_id(), stage);
        self.reporter.log_error(&context, &error);

        self.emit(ImportEvent::Failed {
            attempt_id: attempt.attempt_id,
            stage,
            message: error.to_string(),
            actor_id: error.persisted_actor().map(|actor| actor.id.clone()),
            timestamp: Utc::now(),
        });

        ImportOutcome::Failed { stage, error }
    }

    fn user_message(&self, error: &ImportError) -> String {
        let key = error.message_key();
        match error {
            ImportError::Decode(_) => self.messages.format(key, &[]),
            ImportError::Structure(err) => {
                self.messages.format(key, &[("reason", err.to_string().as_str())])
            }
            ImportError::Migration(err) => {
                self.messages.format(key, &[("reason", err.to_string().as_str())])
            }
            ImportError::ActorCreation(err) => {
                let name = match err {
                    ActorCreationError::Rejected { name, .. }
                    | ActorCreationError::NoIdentity { name } => name,
                };
                self.messages.format(key, &[("name", name.as_str())])
            }
            ImportError::ItemCreation(err) => {
                self.messages.format(key, &[("name", err.actor().name.as_str())])
            }
        }
    }

    fn advance(&self, attempt: &mut ImportAttempt, stage: ImportStage) {
        debug!("Attempt {} entering {}", attempt.attempt_id, stage);
        let transition = attempt.enter(stage);
        self.emit(ImportEvent::from(&transition));
    }

    fn transition(&self, attempt: &mut ImportAttempt, state: ImportState) {
        let transition = attempt.transition_to(state);
        self.emit(ImportEvent::from(&transition));
    }

    fn emit(&self, event: ImportEvent) {
        if let Some(tx) = &self.event_tx {
            tx.emit_lossy(event);
        }
    }
}

impl std::fmt::Debug for ImportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportPipeline")
            .field("module_id", &self.messages.module_id())
            .field("events", &self.event_tx.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::ItemCreationError;

    #[test]
    fn test_partial_outcome_exposes_actor() {
        let actor = EntityHandle::new("a1", "Urgath");
        let outcome = ImportOutcome::Failed {
            stage: ImportStage::CreatingItems,
            error: ImportError::ItemCreation(ItemCreationError::Unconfirmed {
                actor: actor.clone(),
                requested: 2,
                confirmed: 1,
            }),
        };
        assert!(outcome.is_partial());
        assert!(!outcome.is_success());
        assert_eq!(outcome.persisted_actor(), Some(&actor));
    }

    #[test]
    fn test_cancelled_has_no_actor() {
        assert!(!ImportOutcome::Cancelled.is_partial());
        assert!(ImportOutcome::Cancelled.persisted_actor().is_none());
    }
}
