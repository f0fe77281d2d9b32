//! # CIMP Common Library
//!
//! Shared code for the character import tools including:
//! - Common error type
//! - Bootstrap configuration loading (TOML, environment, defaults)
//! - Localized message catalog and lookup
//! - Import state machine types and the event bus

pub mod config;
pub mod error;
pub mod events;
pub mod i18n;

pub use error::{Error, Result};
pub use i18n::{lookup, MessageCatalog, Messages};
