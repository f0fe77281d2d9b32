//! Localized message catalog
//!
//! Messages are addressed by dotted keys (`errors.invalidJson`) and may carry
//! `{param}` placeholders. Host language files are nested JSON objects; they are
//! flattened into dotted keys on load, so a file shaped like
//! `{"character-import": {"errors": {"invalidJson": "..."}}}` provides the key
//! `character-import.errors.invalidJson`.

use crate::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Message key: import began after a file was chosen
pub const IMPORT_STARTED: &str = "notifications.importStarted";
/// Message key: import completed, `{name}` is the stored actor name
pub const IMPORT_SUCCEEDED: &str = "notifications.importSucceeded";
/// Message key: input was not valid JSON
pub const INVALID_JSON: &str = "errors.invalidJson";
/// Message key: input lacked required fields, `{reason}` describes the violation
pub const INVALID_STRUCTURE: &str = "errors.invalidStructure";
/// Message key: older record shape could not be normalized
pub const MIGRATION_FAILED: &str = "errors.migrationFailed";
/// Message key: store refused the actor
pub const ACTOR_CREATION_FAILED: &str = "errors.actorCreationFailed";
/// Message key: actor exists but its items were not created
pub const ITEM_CREATION_FAILED: &str = "errors.itemCreationFailed";

const ENGLISH: [(&str, &str); 7] = [
    (IMPORT_STARTED, "Importing character..."),
    (IMPORT_SUCCEEDED, "Imported character {name}."),
    (INVALID_JSON, "The selected file does not contain valid JSON."),
    (
        INVALID_STRUCTURE,
        "The selected file is not a valid character record: {reason}.",
    ),
    (
        MIGRATION_FAILED,
        "The character record uses an older format that could not be converted: {reason}.",
    ),
    (ACTOR_CREATION_FAILED, "Could not create character {name}."),
    (
        ITEM_CREATION_FAILED,
        "Character {name} was created, but its items could not be imported.",
    ),
];

/// Mapping from dotted message keys to templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCatalog {
    entries: HashMap<String, String>,
}

impl MessageCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in English messages
    pub fn english() -> Self {
        let entries = ENGLISH
            .iter()
            .map(|(key, template)| (key.to_string(), template.to_string()))
            .collect();
        Self { entries }
    }

    /// Parse a host-style language file
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::Catalog(format!("Invalid language file: {}", e)))?;
        let Value::Object(root) = value else {
            return Err(Error::Catalog(
                "Language file must contain a JSON object".to_string(),
            ));
        };

        let mut catalog = Self::new();
        for (key, value) in root {
            flatten_into(&mut catalog.entries, key, value)?;
        }
        Ok(catalog)
    }

    /// Read and parse a language file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&text)?;
        debug!(
            "Loaded {} messages from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Layer this catalog over `base`; entries here win
    pub fn merged_over(self, mut base: MessageCatalog) -> MessageCatalog {
        base.entries.extend(self.entries);
        base
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.entries.insert(key.into(), template.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten_into(entries: &mut HashMap<String, String>, prefix: String, value: Value) -> Result<()> {
    match value {
        Value::String(template) => {
            entries.insert(prefix, template);
            Ok(())
        }
        Value::Object(children) => {
            for (key, child) in children {
                flatten_into(entries, format!("{}.{}", prefix, key), child)?;
            }
            Ok(())
        }
        other => Err(Error::Catalog(format!(
            "Message '{}' must be a string, found {}",
            prefix,
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Resolve `key` in `catalog` and substitute `{param}` placeholders
///
/// Unknown keys resolve to the key itself. Placeholders without a matching
/// parameter are left verbatim. Substituted values are never re-scanned.
pub fn lookup(catalog: &MessageCatalog, key: &str, params: &[(&str, &str)]) -> String {
    match catalog.get(key) {
        Some(template) => substitute(template, params),
        None => key.to_string(),
    }
}

fn substitute(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if after[..close].contains('{') => {
                // Stray brace: keep it and rescan from the inner one
                let inner = after[..close].rfind('{').unwrap_or(0);
                out.push('{');
                out.push_str(&after[..inner]);
                rest = &after[inner..];
            }
            Some(close) => {
                let name = &after[..close];
                match params.iter().find(|(param, _)| *param == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Read-only module identifier plus the catalog its messages live in
#[derive(Debug, Clone)]
pub struct Messages {
    module_id: String,
    catalog: MessageCatalog,
}

impl Messages {
    pub fn new(module_id: impl Into<String>, catalog: MessageCatalog) -> Self {
        Self {
            module_id: module_id.into(),
            catalog,
        }
    }

    /// Built-in English messages under `module_id`
    pub fn english(module_id: impl Into<String>) -> Self {
        Self::new(module_id, MessageCatalog::english())
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// Format a message, preferring the module-namespaced key
    pub fn format(&self, key: &str, params: &[(&str, &str)]) -> String {
        let namespaced = format!("{}.{}", self.module_id, key);
        if self.catalog.get(&namespaced).is_some() {
            lookup(&self.catalog, &namespaced, params)
        } else {
            lookup(&self.catalog, key, params)
        }
    }
}
