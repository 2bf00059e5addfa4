//! Core types for declarative entity compilation

use crate::entity::EntityDescriptor;
use serde_json::Value;

/// An ordered JSON mapping, the shape of every compiled payload body
pub type JsonMap = serde_json::Map<String, Value>;

/// A declared field value
///
/// Values are either plain data, a nested entity compiled against its own
/// schema, or a list of nested entities. Plain data covers scalars as well
/// as raw mappings and sequences that need no entity resolution.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Plain scalar, mapping, or sequence
    Json(Value),
    /// Nested entity, compiled recursively
    Entity(EntityDescriptor),
    /// List of nested entities, compiled element-wise
    EntityList(Vec<EntityDescriptor>),
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Json(Value::String(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Json(Value::String(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Json(Value::Bool(value))
    }
}

impl From<EntityDescriptor> for FieldValue {
    fn from(entity: EntityDescriptor) -> Self {
        Self::Entity(entity)
    }
}

impl From<Vec<EntityDescriptor>> for FieldValue {
    fn from(entities: Vec<EntityDescriptor>) -> Self {
        Self::EntityList(entities)
    }
}
