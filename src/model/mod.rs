//! Domain payload models
//!
//! One module per entity kind with non-trivial compile behavior, mirroring
//! the schema tables in [`crate::schema`].

use crate::config::CirrusConfig;
use entitykit::types::JsonMap;
use serde_json::Value;

pub mod account;
pub mod project;
pub mod provider_spec;

pub use account::{AccountPayload, CredentialProviderBundle, compile_account};
pub use provider_spec::{ProviderSpec, SpecValidator, SpecValidatorSet};

/// Fill in metadata defaults from the loaded context configuration.
///
/// A payload that does not already carry `project_reference` or
/// `owner_reference` gets them from the context's project name and server
/// username. Explicitly declared references are never overwritten.
pub fn apply_metadata_defaults(payload: &mut Value, config: &CirrusConfig) {
    let Some(Value::Object(metadata)) = payload.get_mut("metadata") else {
        return;
    };
    if !metadata.contains_key("project_reference") {
        let mut reference = JsonMap::new();
        reference.insert("kind".to_string(), Value::String("project".to_string()));
        reference.insert(
            "name".to_string(),
            Value::String(config.project.name.clone()),
        );
        metadata.insert("project_reference".to_string(), Value::Object(reference));
    }
    if !metadata.contains_key("owner_reference") {
        let mut reference = JsonMap::new();
        reference.insert("kind".to_string(), Value::String("user".to_string()));
        reference.insert(
            "name".to_string(),
            Value::String(config.server.username.clone()),
        );
        metadata.insert("owner_reference".to_string(), Value::Object(reference));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_defaults_fill_missing_references() {
        let config = CirrusConfig::default();
        let mut payload = json!({
            "spec": {"name": "p", "resources": {}},
            "metadata": {"kind": "project", "name": "p", "uuid": "u-1"}
        });
        apply_metadata_defaults(&mut payload, &config);

        assert_eq!(payload["metadata"]["project_reference"]["kind"], "project");
        assert_eq!(
            payload["metadata"]["project_reference"]["name"],
            config.project.name
        );
        assert_eq!(
            payload["metadata"]["owner_reference"]["name"],
            config.server.username
        );
    }

    #[test]
    fn test_metadata_defaults_keep_declared_references() {
        let config = CirrusConfig::default();
        let mut payload = json!({
            "metadata": {
                "kind": "project",
                "project_reference": {"kind": "project", "name": "declared"}
            }
        });
        apply_metadata_defaults(&mut payload, &config);
        assert_eq!(payload["metadata"]["project_reference"]["name"], "declared");
    }
}
