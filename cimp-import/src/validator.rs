//! Structural validation of decoded input
//!
//! Shallow presence/shape checks on the four required top-level fields.
//! The contents of `system` and of individual items are not inspected.

use crate::record::{ImportRecord, ItemRecord};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Required top-level fields, in reporting order
pub const REQUIRED_FIELDS: [&str; 4] = ["name", "type", "system", "items"];

/// Class of structural violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureViolation {
    NotAnObject,
    Missing,
    WrongShape,
    Empty,
}

/// Coarse JSON shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl Shape {
    pub fn of(value: &Value) -> Shape {
        match value {
            Value::Null => Shape::Null,
            Value::Bool(_) => Shape::Boolean,
            Value::Number(_) => Shape::Number,
            Value::String(_) => Shape::String,
            Value::Array(_) => Shape::Array,
            Value::Object(_) => Shape::Object,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Null => "null",
            Shape::Boolean => "a boolean",
            Shape::Number => "a number",
            Shape::String => "a string",
            Shape::Array => "a sequence",
            Shape::Object => "a mapping",
        };
        f.write_str(name)
    }
}

/// Well-formed input with missing or misshapen required fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    /// Document root is not a mapping
    #[error("record must be a mapping, found {found}")]
    NotAnObject { found: Shape },

    /// One or more required fields absent
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Required field present with the wrong shape
    #[error("field '{field}' must be {expected}, found {found}")]
    WrongShape {
        field: &'static str,
        expected: Shape,
        found: Shape,
    },

    /// Name present but blank
    #[error("field 'name' must not be empty")]
    EmptyName,
}

impl StructureError {
    pub fn violation(&self) -> StructureViolation {
        match self {
            StructureError::NotAnObject { .. } => StructureViolation::NotAnObject,
            StructureError::MissingFields(_) => StructureViolation::Missing,
            StructureError::WrongShape { .. } => StructureViolation::WrongShape,
            StructureError::EmptyName => StructureViolation::Empty,
        }
    }

    /// Offending field; the first one for `MissingFields`
    pub fn field(&self) -> Option<&'static str> {
        match self {
            StructureError::NotAnObject { .. } => None,
            StructureError::MissingFields(fields) => fields.first().copied(),
            StructureError::WrongShape { field, .. } => Some(*field),
            StructureError::EmptyName => Some("name"),
        }
    }
}

/// Check required fields and convert to an `ImportRecord`
pub fn validate(value: Value) -> Result<ImportRecord, StructureError> {
    let mut object = match value {
        Value::Object(object) => object,
        other => {
            return Err(StructureError::NotAnObject {
                found: Shape::of(&other),
            })
        }
    };

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(StructureError::MissingFields(missing));
    }

    let name = take_string(&mut object, "name")?;
    if name.trim().is_empty() {
        return Err(StructureError::EmptyName);
    }
    let kind = take_string(&mut object, "type")?;
    let system = match object.remove("system") {
        Some(Value::Object(system)) => system,
        Some(other) => return Err(wrong_shape("system", Shape::Object, &other)),
        None => return Err(StructureError::MissingFields(vec!["system"])),
    };
    let items = match object.remove("items") {
        Some(Value::Array(items)) => items.into_iter().map(ItemRecord::new).collect(),
        Some(other) => return Err(wrong_shape("items", Shape::Array, &other)),
        None => return Err(StructureError::MissingFields(vec!["items"])),
    };

    Ok(ImportRecord {
        name,
        kind,
        system,
        items,
        extra: object,
    })
}

fn take_string(
    object: &mut Map<String, Value>,
    field: &'static str,
) -> Result<String, StructureError> {
    match object.remove(field) {
        Some(Value::String(text)) => Ok(text),
        Some(other) => Err(wrong_shape(field, Shape::String, &other)),
        None => Err(StructureError::MissingFields(vec![field])),
    }
}

fn wrong_shape(field: &'static str, expected: Shape, found: &Value) -> StructureError {
    StructureError::WrongShape {
        field,
        expected,
        found: Shape::of(found),
    }
}
