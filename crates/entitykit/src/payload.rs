//! Payload envelopes
//!
//! A compiled field mapping becomes transport-ready once wrapped with the
//! standard envelope: `{spec: {name, resources}, metadata: {kind, name,
//! uuid}}`. The metadata identifier is generated fresh at assembly time.

use crate::types::JsonMap;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Envelope metadata identifying a payload to the remote API
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub kind: String,
    pub name: String,
    pub uuid: String,
}

/// Spec body wrapping the compiled resources
#[derive(Debug, Clone, Serialize)]
pub struct Spec {
    pub name: String,
    pub resources: Value,
}

/// A transport-ready payload
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub spec: Spec,
    pub metadata: Metadata,
}

impl Envelope {
    /// The generated metadata identifier.
    pub fn uuid(&self) -> &str {
        &self.metadata.uuid
    }

    /// A reference mapping (`{kind, uuid}`) pointing at this payload.
    pub fn reference(&self) -> Value {
        reference(&self.metadata.kind, &self.metadata.uuid)
    }

    /// The envelope as a plain value, spec before metadata.
    pub fn into_value(self) -> Value {
        let mut spec = JsonMap::new();
        spec.insert("name".to_string(), Value::String(self.spec.name));
        spec.insert("resources".to_string(), self.spec.resources);

        let mut metadata = JsonMap::new();
        metadata.insert("kind".to_string(), Value::String(self.metadata.kind));
        metadata.insert("name".to_string(), Value::String(self.metadata.name));
        metadata.insert("uuid".to_string(), Value::String(self.metadata.uuid));

        let mut envelope = JsonMap::new();
        envelope.insert("spec".to_string(), Value::Object(spec));
        envelope.insert("metadata".to_string(), Value::Object(metadata));
        Value::Object(envelope)
    }
}

/// Wrap a compiled mapping with the standard envelope fields.
pub fn assemble(kind: &str, name: &str, resources: JsonMap) -> Envelope {
    let uuid = Uuid::new_v4().to_string();
    log::debug!("assembled {kind} payload '{name}' ({uuid})");
    Envelope {
        spec: Spec {
            name: name.to_string(),
            resources: Value::Object(resources),
        },
        metadata: Metadata {
            kind: kind.to_string(),
            name: name.to_string(),
            uuid,
        },
    }
}

/// Build a `{kind, uuid}` reference mapping.
pub fn reference(kind: &str, uuid: &str) -> Value {
    let mut map = JsonMap::new();
    map.insert("kind".to_string(), Value::String(kind.to_string()));
    map.insert("uuid".to_string(), Value::String(uuid.to_string()));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assemble_wraps_resources() {
        let mut resources = JsonMap::new();
        resources.insert("type".to_string(), json!("aws"));

        let envelope = assemble("account", "prod", resources);
        assert_eq!(envelope.metadata.kind, "account");
        assert_eq!(envelope.metadata.name, "prod");
        assert_eq!(envelope.spec.name, "prod");
        assert!(!envelope.uuid().is_empty());

        let value = envelope.into_value();
        assert_eq!(value["spec"]["name"], "prod");
        assert_eq!(value["spec"]["resources"]["type"], "aws");
        assert_eq!(value["metadata"]["kind"], "account");
    }

    #[test]
    fn test_each_assembly_generates_a_fresh_identifier() {
        let a = assemble("account", "prod", JsonMap::new());
        let b = assemble("account", "prod", JsonMap::new());
        assert_ne!(a.uuid(), b.uuid());
    }

    #[test]
    fn test_reference_points_at_envelope() {
        let envelope = assemble("provider", "cred", JsonMap::new());
        let reference = envelope.reference();
        assert_eq!(reference["kind"], "provider");
        assert_eq!(reference["uuid"].as_str().unwrap(), envelope.uuid());
    }
}
