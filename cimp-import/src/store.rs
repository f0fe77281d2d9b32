//! Destination document store seam
//!
//! The pipeline only ever creates documents: one parent entity, then one batch
//! of children referencing it. No delete operation is exposed.

use crate::record::{ActorPayload, EntityHandle, ItemRecord};
use thiserror::Error;

/// Store-side failure
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Payload could not be serialized for storage
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Parent identity unknown to the store
    #[error("Parent entity not found: {0}")]
    ParentNotFound(String),

    /// Store refused the document
    #[error("Rejected by store: {0}")]
    Rejected(String),
}

/// Document store accepting create requests
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create the parent entity
    ///
    /// `Ok(None)` means the store accepted the request but produced no identity.
    async fn create_entity(
        &self,
        payload: &ActorPayload,
    ) -> Result<Option<EntityHandle>, StoreError>;

    /// Create child entities owned by `parent`, returning one handle per confirmed child
    async fn create_child_entities(
        &self,
        payloads: &[ItemRecord],
        parent: &EntityHandle,
    ) -> Result<Vec<EntityHandle>, StoreError>;
}
