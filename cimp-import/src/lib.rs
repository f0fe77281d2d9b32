//! cimp-import library interface
//!
//! Character-record import pipeline: decode, validate, migrate legacy shapes,
//! split into actor and items, then persist in two phases. Exposed as a
//! library so hosts and integration tests can supply their own source, store
//! and reporter.

pub mod compat;
pub mod db;
pub mod decoder;
pub mod error;
pub mod models;
pub mod persist;
pub mod pipeline;
pub mod record;
pub mod reporter;
pub mod source;
pub mod splitter;
pub mod store;
pub mod validator;

pub use crate::error::{ImportError, ImportResult};
pub use crate::pipeline::{ImportOutcome, ImportPipeline};
pub use crate::record::{ActorPayload, EntityHandle, ImportRecord, ItemRecord};
pub use crate::reporter::OutcomeReporter;
pub use crate::source::{SourceAcquisition, SourceDocument};
pub use crate::store::{DocumentStore, StoreError};
