//! Persistence orchestration against the document store
//!
//! Two phases, no transaction spanning them:
//! 1. Create the actor. Any failure here leaves nothing persisted.
//! 2. Create all items as one batch parented to the actor's identity. The batch
//!    is submitted even when empty.
//!
//! A failure in phase 2 leaves the actor in place. No compensating delete is
//! issued; the persisted actor travels inside the error so callers can report it.

use crate::record::{ActorPayload, EntityHandle, ItemRecord};
use crate::store::{DocumentStore, StoreError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Store rejected or failed to confirm the parent entity
#[derive(Debug, Error)]
pub enum ActorCreationError {
    #[error("store rejected actor '{name}': {source}")]
    Rejected {
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("store returned no usable identity for actor '{name}'")]
    NoIdentity { name: String },
}

/// Store rejected or failed to confirm child entities after the parent was created
#[derive(Debug, Error)]
pub enum ItemCreationError {
    #[error("store rejected items for actor '{}' ({}): {source}", .actor.name, .actor.id)]
    Rejected {
        actor: EntityHandle,
        #[source]
        source: StoreError,
    },

    #[error(
        "store confirmed {confirmed} of {requested} items for actor '{}' ({})",
        .actor.name,
        .actor.id
    )]
    Unconfirmed {
        actor: EntityHandle,
        requested: usize,
        confirmed: usize,
    },
}

impl ItemCreationError {
    /// The actor that remains persisted
    pub fn actor(&self) -> &EntityHandle {
        match self {
            ItemCreationError::Rejected { actor, .. }
            | ItemCreationError::Unconfirmed { actor, .. } => actor,
        }
    }
}

/// Phase 1: create the parent entity
pub async fn create_actor(
    store: &dyn DocumentStore,
    payload: &ActorPayload,
) -> Result<EntityHandle, ActorCreationError> {
    debug!("Creating actor '{}' ({})", payload.name, payload.kind);

    let handle = store
        .create_entity(payload)
        .await
        .map_err(|source| ActorCreationError::Rejected {
            name: payload.name.clone(),
            source,
        })?;

    match handle {
        Some(handle) if handle.is_usable() => {
            info!("Created actor '{}' with id {}", handle.name, handle.id);
            Ok(handle)
        }
        _ => Err(ActorCreationError::NoIdentity {
            name: payload.name.clone(),
        }),
    }
}

/// Phase 2: create all items parented to `actor`
pub async fn create_items(
    store: &dyn DocumentStore,
    items: &[ItemRecord],
    actor: &EntityHandle,
) -> Result<Vec<EntityHandle>, ItemCreationError> {
    debug!("Submitting {} items for actor '{}'", items.len(), actor.name);

    let created = store
        .create_child_entities(items, actor)
        .await
        .map_err(|source| ItemCreationError::Rejected {
            actor: actor.clone(),
            source,
        })?;

    let confirmed = created.iter().filter(|handle| handle.is_usable()).count();
    if confirmed < items.len() {
        warn!(
            "Store confirmed only {} of {} items for actor {}",
            confirmed,
            items.len(),
            actor.id
        );
        return Err(ItemCreationError::Unconfirmed {
            actor: actor.clone(),
            requested: items.len(),
            confirmed,
        });
    }

    info!("Created {} items for actor '{}'", created.len(), actor.name);
    Ok(created)
}
