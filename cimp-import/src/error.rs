//! Error types for cimp-import
//!
//! One variant per pipeline failure class. Each maps to the stage it
//! terminates and to the localized message shown to the user.

use crate::compat::MigrationError;
use crate::decoder::DecodeError;
use crate::persist::{ActorCreationError, ItemCreationError};
use crate::record::EntityHandle;
use crate::validator::StructureError;
use cimp_common::events::ImportStage;
use cimp_common::i18n;
use thiserror::Error;

/// Terminal failure of one import attempt
#[derive(Debug, Error)]
pub enum ImportError {
    /// Malformed input bytes or syntax
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Well-formed input with missing or misshapen required fields
    #[error("Structure error: {0}")]
    Structure(#[from] StructureError),

    /// Recognized old shape that could not be normalized
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    /// Parent entity not created; nothing persisted
    #[error("Actor creation error: {0}")]
    ActorCreation(#[from] ActorCreationError),

    /// Parent entity persisted, children not (partial success)
    #[error("Item creation error: {0}")]
    ItemCreation(#[from] ItemCreationError),
}

impl ImportError {
    /// Stage in which the attempt terminated
    pub fn stage(&self) -> ImportStage {
        match self {
            ImportError::Decode(_) => ImportStage::Decoding,
            ImportError::Structure(_) => ImportStage::Validating,
            ImportError::Migration(_) => ImportStage::Migrating,
            ImportError::ActorCreation(_) => ImportStage::CreatingActor,
            ImportError::ItemCreation(_) => ImportStage::CreatingItems,
        }
    }

    /// Catalog key of the user-facing message
    pub fn message_key(&self) -> &'static str {
        match self {
            ImportError::Decode(_) => i18n::INVALID_JSON,
            ImportError::Structure(_) => i18n::INVALID_STRUCTURE,
            ImportError::Migration(_) => i18n::MIGRATION_FAILED,
            ImportError::ActorCreation(_) => i18n::ACTOR_CREATION_FAILED,
            ImportError::ItemCreation(_) => i18n::ITEM_CREATION_FAILED,
        }
    }

    /// Actor left persisted by this failure, if any
    pub fn persisted_actor(&self) -> Option<&EntityHandle> {
        match self {
            ImportError::ItemCreation(err) => Some(err.actor()),
            _ => None,
        }
    }
}

/// Result type for pipeline stages
pub type ImportResult<T> = Result<T, ImportError>;
