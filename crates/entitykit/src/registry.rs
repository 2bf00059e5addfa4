//! Schema registry - ordered field descriptor tables looked up by schema name
//!
//! The registry is populated once during process initialization and is
//! read-only afterwards. Registration is append-only; there is no removal.

use crate::error::{Error, Result};
use crate::types::JsonMap;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Capability tag a field value is validated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain string
    String,
    /// Signed integer
    Int,
    /// Boolean flag
    Bool,
    /// Arbitrary nested mapping
    Dict,
    /// List of strings
    StringList,
    /// List of mappings
    DictList,
    /// Reference to another entity (`{kind, name/uuid}`)
    Reference,
    /// List of entity references
    ReferenceList,
    /// Secret-bearing value; compiled output always carries the
    /// `is_secret_modified` marker
    Secret,
    /// Resource-quota map (resource name -> amount)
    QuotaMap,
    /// Raw provider specification blob, validated by a provider-specific
    /// collaborator rather than the field validator
    Spec,
    /// Nested entity compiled against its own schema
    Entity,
    /// List of nested entities
    EntityList,
}

/// Descriptor for a single schema field
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub default: Option<Value>,
    pub optional: bool,
}

impl FieldDescriptor {
    /// A field that must resolve to a value (declared or defaulted).
    pub fn required(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: None,
            optional: false,
        }
    }

    /// A field that may be absent from the compiled output.
    pub fn optional(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: None,
            optional: true,
        }
    }

    /// Attach a default used when no declaration provides a value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// Compile-transform hook for a schema
///
/// Receives the validated field mapping and returns a transformed mapping.
/// Hooks may restructure, rename, drop, or synthesize fields; they never see
/// the source entity descriptor.
pub type CompileHook = fn(JsonMap) -> Result<JsonMap>;

/// Field table and optional compile hook for one entity kind
#[derive(Debug)]
pub struct Schema {
    name: String,
    fields: IndexMap<String, FieldDescriptor>,
    hook: Option<CompileHook>,
}

impl Schema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: IndexMap::new(),
            hook: None,
        }
    }

    /// Append a field descriptor. Declaration order is the output order.
    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Attach a compile hook run after field validation.
    pub fn hook(mut self, hook: CompileHook) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered field descriptors, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn descriptor(&self, field: &str) -> Option<&FieldDescriptor> {
        self.fields.get(field)
    }

    pub fn compile_hook(&self) -> Option<CompileHook> {
        self.hook
    }
}

/// Registry of every schema the process knows about
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema. Later registrations under the same name replace
    /// earlier ones, which only matters before `install`.
    pub fn register(&mut self, schema: Schema) {
        self.schemas.insert(schema.name().to_string(), schema);
    }

    /// Look up a schema by name.
    pub fn lookup(&self, name: &str) -> Result<&Schema> {
        self.schemas
            .get(name)
            .ok_or_else(|| Error::UnknownSchema(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();

/// Install the process-wide registry.
///
/// The first call builds and installs; every later call returns the already
/// installed registry without invoking the builder. Initialization
/// happens-before any compile that goes through the installed registry.
pub fn install(build: impl FnOnce() -> SchemaRegistry) -> &'static SchemaRegistry {
    REGISTRY.get_or_init(|| {
        let registry = build();
        log::debug!("installed schema registry with {} schemas", registry.len());
        registry
    })
}

/// The installed registry, if any.
pub fn global() -> Option<&'static SchemaRegistry> {
    REGISTRY.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_unknown_schema() {
        let registry = SchemaRegistry::new();
        let err = registry.lookup("Ghost").unwrap_err();
        assert!(matches!(err, Error::UnknownSchema(name) if name == "Ghost"));
    }

    #[test]
    fn test_field_order_is_declaration_order() {
        let schema = Schema::new("Widget")
            .field(FieldDescriptor::required("zeta", FieldKind::String))
            .field(FieldDescriptor::required("alpha", FieldKind::Int));

        let names: Vec<&str> = schema.fields().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = SchemaRegistry::new();
        registry.register(Schema::new("Widget"));
        assert!(registry.contains("Widget"));
        assert_eq!(registry.lookup("Widget").unwrap().name(), "Widget");
    }
}
