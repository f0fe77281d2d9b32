//! Import attempt data models

pub mod import_attempt;

pub use import_attempt::ImportAttempt;
