//! Test Helper Utilities
//!
//! Shared collaborators and fixtures for testing cimp-import

pub mod doubles;
pub mod log_capture;

// Re-export commonly used items
pub use doubles::{
    character_fixture, ActorBehaviour, ItemBehaviour, RecordingReporter, RecordingStore,
    ScriptedSource, StoreCall,
};
pub use log_capture::LogCapture;
