//! Record types flowing through the import pipeline
//!
//! `ImportRecord` is the validated shape of one input file. The splitter turns
//! it into an `ActorPayload` plus the ordered `ItemRecord`s; the store answers
//! with `EntityHandle`s.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Validated character record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    /// Actor name (non-blank)
    pub name: String,
    /// Actor kind, e.g. "character"
    #[serde(rename = "type")]
    pub kind: String,
    /// Domain-specific fields, passed through untouched
    pub system: Map<String, Value>,
    /// Owned sub-records in input order
    pub items: Vec<ItemRecord>,
    /// Any other top-level keys (img, flags, prototypeToken, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One owned sub-record; contents belong to the destination store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemRecord(pub Value);

impl ItemRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Item name, if the record carries one
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Item kind (`type` key), if the record carries one
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Map<String, Value>> {
        self.0.as_object_mut()
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Import record without its items; submitted to create the parent entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorPayload {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub system: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActorPayload {
    /// JSON document as submitted to the store
    pub fn to_value(&self) -> Value {
        let mut object = self.extra.clone();
        object.insert("name".to_string(), Value::String(self.name.clone()));
        object.insert("type".to_string(), Value::String(self.kind.clone()));
        object.insert("system".to_string(), Value::Object(self.system.clone()));
        Value::Object(object)
    }
}

/// Store confirmation of a created entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    /// Opaque store identity
    pub id: String,
    /// Name as resolved by the store
    pub name: String,
}

impl EntityHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Whether the identity can serve as a parent reference
    pub fn is_usable(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extra_fields_round_trip_through_payload() {
        let record: ImportRecord = serde_json::from_value(json!({
            "name": "Urgath",
            "type": "character",
            "img": "icons/urgath.png",
            "system": {"hp": 12},
            "items": []
        }))
        .unwrap();

        assert_eq!(record.extra.get("img"), Some(&json!("icons/urgath.png")));
        assert!(!record.extra.contains_key("items"));

        let payload = ActorPayload {
            name: record.name,
            kind: record.kind,
            system: record.system,
            extra: record.extra,
        };
        assert_eq!(
            payload.to_value(),
            json!({
                "name": "Urgath",
                "type": "character",
                "img": "icons/urgath.png",
                "system": {"hp": 12}
            })
        );
    }

    #[test]
    fn test_item_accessors() {
        let item = ItemRecord::new(json!({"name": "Bronze Sword", "type": "weapon"}));
        assert_eq!(item.name(), Some("Bronze Sword"));
        assert_eq!(item.kind(), Some("weapon"));
        assert_eq!(ItemRecord::new(json!(3)).name(), None);
    }

    #[test]
    fn test_blank_handle_not_usable() {
        assert!(EntityHandle::new("a1", "A").is_usable());
        assert!(!EntityHandle::new("  ", "A").is_usable());
    }
}
