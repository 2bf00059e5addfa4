//! Entity descriptors and the compile pipeline
//!
//! An entity descriptor is one declared resource: a schema name, a set of
//! field values, and zero or more base descriptors it extends. Descriptors
//! are immutable once declared; `compile()` consumes nothing and produces a
//! self-contained ordered mapping ready for payload assembly.

use crate::error::{Error, Result};
use crate::registry::SchemaRegistry;
use crate::types::{FieldValue, JsonMap};
use crate::validate;
use indexmap::IndexMap;
use serde_json::Value;

/// One declared resource definition
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    schema: String,
    name: String,
    bases: Vec<EntityDescriptor>,
    fields: IndexMap<String, FieldValue>,
}

impl EntityDescriptor {
    /// Start declaring an entity of the given schema.
    pub fn declare(schema: &str, name: &str) -> Self {
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
            bases: Vec::new(),
            fields: IndexMap::new(),
        }
    }

    /// Extend a base descriptor. Bases are merged left to right, so fields
    /// from later bases and from this descriptor override earlier ones.
    pub fn base(mut self, base: EntityDescriptor) -> Self {
        self.bases.push(base);
        self
    }

    /// Assign a field value.
    pub fn field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn schema_name(&self) -> &str {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full field set after base composition: every base's fields in order,
    /// overridden by the most-derived assignments.
    fn merged_fields(&self) -> IndexMap<&str, &FieldValue> {
        let mut merged: IndexMap<&str, &FieldValue> = IndexMap::new();
        for base in &self.bases {
            for (name, value) in base.merged_fields() {
                merged.insert(name, value);
            }
        }
        for (name, value) in &self.fields {
            merged.insert(name.as_str(), value);
        }
        merged
    }

    /// Compile this declaration into an ordered, transport-ready mapping.
    ///
    /// Resolves the composed field set, validates every field against the
    /// schema's descriptors, then runs the schema's compile hook if one is
    /// declared. Output keys follow the schema's field declaration order.
    /// Any failure aborts the compile; partial payloads are never returned.
    pub fn compile(&self, registry: &SchemaRegistry) -> Result<JsonMap> {
        let schema = registry.lookup(&self.schema)?;
        let merged = self.merged_fields();

        for field in merged.keys() {
            if schema.descriptor(field).is_none() {
                return Err(Error::UnexpectedField {
                    schema: self.schema.clone(),
                    field: (*field).to_string(),
                });
            }
        }

        let mut compiled = JsonMap::new();
        for descriptor in schema.fields() {
            let resolved = match merged.get(descriptor.name.as_str()) {
                Some(value) => Some(self.resolve(value, registry)?),
                None => descriptor.default.clone(),
            };
            match resolved {
                Some(value) => {
                    let value = validate::validate(descriptor, value)?;
                    compiled.insert(descriptor.name.clone(), value);
                }
                None if descriptor.optional => {}
                None => {
                    return Err(Error::MissingField {
                        schema: self.schema.clone(),
                        field: descriptor.name.clone(),
                    });
                }
            }
        }

        log::debug!(
            "compiled {} '{}' ({} fields)",
            self.schema,
            self.name,
            compiled.len()
        );

        match schema.compile_hook() {
            Some(hook) => hook(compiled),
            None => Ok(compiled),
        }
    }

    /// Resolve a declared value to plain data, compiling nested entities
    /// against their own schemas.
    fn resolve(&self, value: &FieldValue, registry: &SchemaRegistry) -> Result<Value> {
        match value {
            FieldValue::Json(value) => Ok(value.clone()),
            FieldValue::Entity(entity) => Ok(Value::Object(entity.compile(registry)?)),
            FieldValue::EntityList(entities) => {
                let mut items = Vec::with_capacity(entities.len());
                for entity in entities {
                    items.push(Value::Object(entity.compile(registry)?));
                }
                Ok(Value::Array(items))
            }
        }
    }
}
