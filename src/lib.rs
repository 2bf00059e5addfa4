//! # cirrus
//!
//! Declarative entity compiler for a cloud management API.
//!
//! Resource definitions (accounts, providers, resource types, projects,
//! provider specs) are declared as entity descriptors, validated against
//! per-kind schema tables, transformed by type-specific compile hooks, and
//! assembled into transport-ready payload envelopes. Transport, definition
//! loading, and presentation are collaborator concerns; everything here is a
//! pure validate-or-fail transformation over in-memory structures.
//!
//! ## Example
//!
//! ```
//! use cirrus::{EntityDescriptor, schema};
//! use serde_json::json;
//!
//! let project = EntityDescriptor::declare(schema::PROJECT, "dev-project")
//!     .field(
//!         "provider_list",
//!         vec![
//!             EntityDescriptor::declare(schema::PROJECT_PROVIDER, "ntnx")
//!                 .field("provider_type", "nutanix_pc")
//!                 .field("account_reference", json!({"kind": "account", "name": "ntnx"})),
//!         ],
//!     )
//!     .field("quotas", json!({"STORAGE": 5, "VCPUS": 2}));
//!
//! let compiled = cirrus::compile(&project).unwrap();
//! assert_eq!(compiled["account_reference_list"][0]["name"], "ntnx");
//! ```
//!
//! Compiled payloads are ordered mappings: the same declaration always
//! produces the same key order, so serialized output is stable apart from
//! freshly generated identifiers.

pub mod config;
pub mod model;
pub mod schema;

// Re-export the framework surface alongside the domain types
pub use config::CirrusConfig;
pub use entitykit::{
    EntityDescriptor, Envelope, Error, FieldValue, JsonMap, Result, SchemaRegistry,
};
pub use model::{
    AccountPayload, CredentialProviderBundle, ProviderSpec, SpecValidatorSet, compile_account,
};

/// Install the domain schema registry (idempotent) and return it.
pub fn init() -> &'static SchemaRegistry {
    schema::init()
}

/// Compile a declared entity against the installed registry.
pub fn compile(entity: &EntityDescriptor) -> Result<JsonMap> {
    entity.compile(init())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_end_to_end() {
        let provider = EntityDescriptor::declare(schema::PROJECT_PROVIDER, "ntnx")
            .field("provider_type", "nutanix_pc")
            .field(
                "account_reference",
                json!({"kind": "account", "name": "ntnx-account"}),
            )
            .field(
                "subnet_reference_list",
                json!([
                    {"kind": "subnet", "name": "A"},
                    {"kind": "subnet", "name": "B"}
                ]),
            );

        let project = EntityDescriptor::declare(schema::PROJECT, "dev-project")
            .field("provider_list", vec![provider])
            .field("quotas", json!({"STORAGE": 5, "VCPUS": 2}));

        let compiled = compile(&project).unwrap();

        assert_eq!(
            compiled["subnet_reference_list"],
            json!([
                {"kind": "subnet", "name": "A"},
                {"kind": "subnet", "name": "B"}
            ])
        );
        let resources = compiled["resource_domain"]["resources"].as_array().unwrap();
        assert!(resources.contains(&json!({"limit": 5_368_709_120_i64, "resource_type": "STORAGE"})));
        assert!(resources.contains(&json!({"limit": 2, "resource_type": "VCPUS"})));
    }

    #[test]
    fn test_compiled_payload_assembles_into_envelope() {
        let account = EntityDescriptor::declare(schema::ACCOUNT, "aws-prod").field("type", "aws");
        let compiled = compile(&account).unwrap();
        let envelope = entitykit::assemble("account", "aws-prod", compiled);

        let value = envelope.into_value();
        assert_eq!(value["metadata"]["kind"], "account");
        assert_eq!(value["metadata"]["name"], "aws-prod");
        assert_eq!(value["spec"]["name"], "aws-prod");
        assert_eq!(value["spec"]["resources"]["type"], "aws");
        assert!(!value["metadata"]["uuid"].as_str().unwrap().is_empty());
    }
}
