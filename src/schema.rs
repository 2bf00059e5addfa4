//! Domain schema tables
//!
//! Every entity kind cirrus can compile is declared here: its ordered field
//! descriptors, defaults, and compile hook. Registration happens once per
//! process behind the registry's one-time barrier; the tables are read-only
//! afterwards.

use crate::model;
use entitykit::registry::{self, FieldDescriptor, FieldKind, Schema, SchemaRegistry};
use serde_json::json;

/// Schema name for account declarations
pub const ACCOUNT: &str = "Account";
/// Schema name for standalone provider declarations
pub const PROVIDER: &str = "Provider";
/// Schema name for standalone resource-type declarations
pub const RESOURCE_TYPE: &str = "ResourceType";
/// Schema name for project declarations
pub const PROJECT: &str = "Project";
/// Schema name for a project's per-provider block
pub const PROJECT_PROVIDER: &str = "ProjectProvider";
/// Schema name for provider specification blobs
pub const PROVIDER_SPEC: &str = "ProviderSpec";
/// Schema name for credential declarations
pub const CREDENTIAL: &str = "Credential";

/// Build the full domain registry.
pub fn build_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();

    registry.register(
        Schema::new(ACCOUNT)
            .field(FieldDescriptor::required("type", FieldKind::String))
            .field(FieldDescriptor::required("data", FieldKind::Dict).with_default(json!({})))
            .field(FieldDescriptor::optional("sync_interval_secs", FieldKind::Int)),
    );

    registry.register(
        Schema::new(PROVIDER).field(
            FieldDescriptor::required("auth_schema_list", FieldKind::DictList)
                .with_default(json!([])),
        ),
    );

    registry.register(
        Schema::new(RESOURCE_TYPE)
            .field(
                FieldDescriptor::required("variables", FieldKind::DictList).with_default(json!([])),
            )
            .field(
                FieldDescriptor::required("cred_attrs", FieldKind::DictList)
                    .with_default(json!([])),
            )
            .field(
                FieldDescriptor::required("action_list", FieldKind::DictList)
                    .with_default(json!([])),
            ),
    );

    registry.register(
        Schema::new(PROJECT)
            .field(
                FieldDescriptor::required("provider_list", FieldKind::EntityList)
                    .with_default(json!([])),
            )
            .field(FieldDescriptor::optional(
                "user_reference_list",
                FieldKind::ReferenceList,
            ))
            .field(FieldDescriptor::optional(
                "external_user_group_reference_list",
                FieldKind::ReferenceList,
            ))
            .field(FieldDescriptor::optional("quotas", FieldKind::QuotaMap))
            .field(FieldDescriptor::optional(
                "environment_definition_list",
                FieldKind::DictList,
            ))
            .hook(model::project::compile_hook),
    );

    registry.register(
        Schema::new(PROJECT_PROVIDER)
            .field(FieldDescriptor::required("provider_type", FieldKind::String))
            .field(FieldDescriptor::required(
                "account_reference",
                FieldKind::Reference,
            ))
            .field(FieldDescriptor::optional(
                "subnet_reference_list",
                FieldKind::ReferenceList,
            ))
            .field(FieldDescriptor::optional(
                "external_network_list",
                FieldKind::ReferenceList,
            ))
            .field(FieldDescriptor::optional(
                "default_subnet_reference",
                FieldKind::Reference,
            )),
    );

    registry.register(
        Schema::new(PROVIDER_SPEC).field(FieldDescriptor::required("spec", FieldKind::Spec)),
    );

    registry.register(
        Schema::new(CREDENTIAL)
            .field(FieldDescriptor::required("username", FieldKind::String))
            .field(FieldDescriptor::required("secret", FieldKind::Secret))
            .field(
                FieldDescriptor::required("type", FieldKind::String)
                    .with_default(json!("PASSWORD")),
            ),
    );

    registry
}

/// Install the process-wide registry. First call builds it; later calls
/// return the installed instance.
pub fn init() -> &'static SchemaRegistry {
    registry::install(build_registry)
}
