//! Compatibility shim for older record shapes
//!
//! Each `Migration` variant is one rewrite rule keyed by a schema signature it
//! can detect in a validated record. Rules are pure and idempotent: once a rule
//! has run, its signature is gone and it no longer matches.
//!
//! # Adding a rule
//!
//! 1. **Never modify an existing rule** - files exported in that shape still exist
//! 2. **Add a variant** - with its own `matches` and `apply` arms
//! 3. **Append it to `Migration::ALL`** - rules run in that order
//!
//! The pipeline only calls `migrate`; it does not change when rules are added.

use crate::record::ImportRecord;
use crate::validator::Shape;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

/// A recognized old shape could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    #[error("{migration}: item {index} field '{field}' must be {expected}, found {found}")]
    InvalidShape {
        migration: &'static str,
        index: usize,
        field: &'static str,
        expected: Shape,
        found: Shape,
    },
}

/// Known rewrite rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migration {
    /// Items from older host versions keep their fields under `data` instead of `system`
    LegacyItemData,
    /// Exports from another store carry `_id` keys that must not be reused
    StoredIdentifiers,
}

impl Migration {
    /// All rules in application order
    pub const ALL: [Migration; 2] = [Migration::LegacyItemData, Migration::StoredIdentifiers];

    pub fn name(self) -> &'static str {
        match self {
            Migration::LegacyItemData => "legacy_item_data",
            Migration::StoredIdentifiers => "stored_identifiers",
        }
    }

    /// Whether the record carries this rule's signature
    pub fn matches(self, record: &ImportRecord) -> bool {
        match self {
            Migration::LegacyItemData => record.items.iter().any(|item| {
                item.as_object().is_some_and(|object| {
                    object.contains_key("data") && !object.contains_key("system")
                })
            }),
            Migration::StoredIdentifiers => {
                record.extra.contains_key("_id")
                    || record.items.iter().any(|item| {
                        item.as_object()
                            .is_some_and(|object| object.contains_key("_id"))
                    })
            }
        }
    }

    /// Rewrite the record
    pub fn apply(self, mut record: ImportRecord) -> Result<ImportRecord, MigrationError> {
        match self {
            Migration::LegacyItemData => {
                for (index, item) in record.items.iter_mut().enumerate() {
                    let Some(object) = item.as_object_mut() else {
                        continue;
                    };
                    if object.contains_key("system") {
                        continue;
                    }
                    match object.remove("data") {
                        Some(Value::Object(data)) => {
                            object.insert("system".to_string(), Value::Object(data));
                        }
                        Some(other) => {
                            return Err(MigrationError::InvalidShape {
                                migration: self.name(),
                                index,
                                field: "data",
                                expected: Shape::Object,
                                found: Shape::of(&other),
                            });
                        }
                        None => {}
                    }
                }
            }
            Migration::StoredIdentifiers => {
                record.extra.remove("_id");
                for item in record.items.iter_mut() {
                    if let Some(object) = item.as_object_mut() {
                        object.remove("_id");
                    }
                }
            }
        }
        Ok(record)
    }
}

/// Rules whose signature is present in `record`
pub fn detect_signature(record: &ImportRecord) -> Vec<Migration> {
    Migration::ALL
        .into_iter()
        .filter(|migration| migration.matches(record))
        .collect()
}

/// Normalize `record` into the current shape; unchanged when no rule matches
pub fn migrate(mut record: ImportRecord) -> Result<ImportRecord, MigrationError> {
    let pending = detect_signature(&record);
    if pending.is_empty() {
        debug!("Record '{}' already in current shape", record.name);
        return Ok(record);
    }

    for migration in pending {
        record = migration.apply(record)?;
        info!("Applied migration {} to '{}'", migration.name(), record.name);
    }
    Ok(record)
}
