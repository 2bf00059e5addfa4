//! Account payload assembly
//!
//! Most account declarations compile into one payload. A credential-provider
//! account instead decomposes into three dependent payloads - a provider, a
//! resource type, and the account itself - each embedding the identifier the
//! previous payload generated, so creation order matters.

use entitykit::entity::EntityDescriptor;
use entitykit::error::Result;
use entitykit::payload::{self, Envelope};
use entitykit::registry::SchemaRegistry;
use entitykit::stamp::{self, StampContext};
use entitykit::types::JsonMap;
use serde_json::Value;

/// Declared account type that expands into a composite bundle
pub const CREDENTIAL_PROVIDER: &str = "credential_provider";

/// Account type submitted to the remote API for such accounts
pub const CUSTOM_PROVIDER: &str = "custom_provider";

const ACCOUNT_KIND: &str = "account";
const PROVIDER_KIND: &str = "provider";
const RESOURCE_TYPE_KIND: &str = "resource_type";

/// Result of compiling an account declaration
#[derive(Debug)]
pub enum AccountPayload {
    /// One transport-ready payload
    Single(Envelope),
    /// Provider + resource type + account, created in that order
    CredentialProvider(CredentialProviderBundle),
}

impl AccountPayload {
    /// The payload(s) as a plain value: a single envelope, or a mapping of
    /// the three bundle payloads keyed by role.
    pub fn into_value(self) -> Value {
        match self {
            Self::Single(envelope) => envelope.into_value(),
            Self::CredentialProvider(bundle) => bundle.into_value(),
        }
    }
}

/// Interdependent payloads produced from one credential-provider account
#[derive(Debug)]
pub struct CredentialProviderBundle {
    pub provider: Envelope,
    pub resource_type: Envelope,
    pub account: Envelope,
}

impl CredentialProviderBundle {
    /// Payloads in required creation order. Each later payload embeds the
    /// identifier generated for an earlier one, so submission must not be
    /// reordered.
    pub fn creation_order(&self) -> [&Envelope; 3] {
        [&self.provider, &self.resource_type, &self.account]
    }

    pub fn into_value(self) -> Value {
        let mut map = JsonMap::new();
        map.insert("provider".to_string(), self.provider.into_value());
        map.insert("resource_type".to_string(), self.resource_type.into_value());
        map.insert("account".to_string(), self.account.into_value());
        Value::Object(map)
    }
}

/// Compile an account declaration into its payload(s).
pub fn compile_account(
    entity: &EntityDescriptor,
    registry: &SchemaRegistry,
) -> Result<AccountPayload> {
    let resources = entity.compile(registry)?;
    let account_type = resources.get("type").and_then(Value::as_str).unwrap_or("");

    if account_type == CREDENTIAL_PROVIDER {
        log::debug!("account '{}' expands to a credential provider bundle", entity.name());
        let bundle = credential_provider_bundle(entity.name(), &resources);
        Ok(AccountPayload::CredentialProvider(bundle))
    } else {
        Ok(AccountPayload::Single(payload::assemble(
            ACCOUNT_KIND,
            entity.name(),
            resources,
        )))
    }
}

fn credential_provider_bundle(name: &str, resources: &JsonMap) -> CredentialProviderBundle {
    let data = resources
        .get("data")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let provider = provider_payload(name, &data);
    let resource_type = resource_type_payload(name, &data, &provider);
    let account = account_payload(name, &data, &resource_type);

    CredentialProviderBundle {
        provider,
        resource_type,
        account,
    }
}

/// Provider payload: the auth schema with values cleared, stamped, and
/// secret-marked.
fn provider_payload(name: &str, data: &JsonMap) -> Envelope {
    let mut auth_schema = element_list(data, "auth_schema_list");
    for entry in &mut auth_schema {
        if let Value::Object(entry) = entry {
            entry.insert("value".to_string(), Value::String(String::new()));
        }
    }
    let mut ctx = StampContext::new();
    stamp::stamp_list(&mut auth_schema, &mut ctx);
    stamp::mark_secrets(&mut auth_schema);

    let mut resources = JsonMap::new();
    resources.insert("auth_schema_list".to_string(), Value::Array(auth_schema));
    payload::assemble(PROVIDER_KIND, name, resources)
}

/// Resource-type payload: input/output variable lists plus the stamped
/// action list, referencing the provider payload's identifier.
fn resource_type_payload(name: &str, data: &JsonMap, provider: &Envelope) -> Envelope {
    let config = data
        .get("resource_config")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let mut input_vars = element_list(&config, "variables");
    let mut output_vars = element_list(&config, "cred_attrs");
    let mut actions = element_list(&config, "action_list");

    // One call-scoped context so action references resolve across the tree.
    let mut ctx = StampContext::new();
    stamp::stamp_list(&mut actions, &mut ctx);
    stamp::stamp_list(&mut input_vars, &mut ctx);
    stamp::stamp_list(&mut output_vars, &mut ctx);
    stamp::mark_secrets(&mut input_vars);
    stamp::mark_secrets(&mut output_vars);

    let mut resources = JsonMap::new();
    resources.insert("provider_reference".to_string(), provider.reference());
    resources.insert("variable_list".to_string(), Value::Array(input_vars));
    resources.insert("schema_list".to_string(), Value::Array(output_vars));
    resources.insert("action_list".to_string(), Value::Array(actions));
    payload::assemble(RESOURCE_TYPE_KIND, name, resources)
}

/// Account payload: references the resource-type payload and carries the
/// declared auth schema as its variable list.
fn account_payload(name: &str, data: &JsonMap, resource_type: &Envelope) -> Envelope {
    let mut variable_list = element_list(data, "auth_schema_list");
    let mut ctx = StampContext::new();
    stamp::stamp_list(&mut variable_list, &mut ctx);
    stamp::mark_secrets(&mut variable_list);

    let mut inner = JsonMap::new();
    inner.insert(
        "resource_type_reference".to_string(),
        resource_type.reference(),
    );
    inner.insert("variable_list".to_string(), Value::Array(variable_list));

    let mut resources = JsonMap::new();
    resources.insert(
        "type".to_string(),
        Value::String(CUSTOM_PROVIDER.to_string()),
    );
    resources.insert("data".to_string(), Value::Object(inner));
    payload::assemble(ACCOUNT_KIND, name, resources)
}

fn element_list(map: &JsonMap, key: &str) -> Vec<Value> {
    match map.get(key) {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{self, ACCOUNT};
    use serde_json::json;

    fn credential_provider_account() -> EntityDescriptor {
        EntityDescriptor::declare(ACCOUNT, "vault")
            .field("type", CREDENTIAL_PROVIDER)
            .field(
                "data",
                json!({
                    "auth_schema_list": [
                        {"name": "username", "type": "LOCAL", "value": "admin"},
                        {"name": "token", "type": "SECRET", "value": "s3cret"}
                    ],
                    "resource_config": {
                        "variables": [
                            {"name": "endpoint", "type": "LOCAL"},
                            {"name": "api_key", "type": "SECRET"}
                        ],
                        "cred_attrs": [
                            {"name": "session", "type": "SECRET"}
                        ],
                        "action_list": [
                            {"name": "verify", "child_tasks": [{"name": "ping"}]}
                        ]
                    }
                }),
            )
    }

    #[test]
    fn test_plain_account_compiles_to_single_payload() {
        let registry = schema::build_registry();
        let account = EntityDescriptor::declare(ACCOUNT, "aws-prod")
            .field("type", "aws")
            .field("data", json!({"access_key_id": "AKIA...", "regions": []}));

        let AccountPayload::Single(envelope) = compile_account(&account, &registry).unwrap()
        else {
            panic!("expected a single payload");
        };
        assert_eq!(envelope.metadata.kind, "account");
        assert_eq!(envelope.metadata.name, "aws-prod");
        let value = envelope.into_value();
        assert_eq!(value["spec"]["resources"]["type"], "aws");
    }

    #[test]
    fn test_bundle_creation_order_and_references() {
        let registry = schema::build_registry();
        let account = credential_provider_account();

        let AccountPayload::CredentialProvider(bundle) =
            compile_account(&account, &registry).unwrap()
        else {
            panic!("expected a credential provider bundle");
        };

        let kinds: Vec<&str> = bundle
            .creation_order()
            .iter()
            .map(|p| p.metadata.kind.as_str())
            .collect();
        assert_eq!(kinds, vec!["provider", "resource_type", "account"]);

        // The resource type points at the provider's generated identifier.
        let rt = bundle.resource_type.clone().into_value();
        assert_eq!(
            rt["spec"]["resources"]["provider_reference"]["uuid"]
                .as_str()
                .unwrap(),
            bundle.provider.uuid()
        );

        // The account points at the resource type's generated identifier.
        let account = bundle.account.clone().into_value();
        assert_eq!(
            account["spec"]["resources"]["data"]["resource_type_reference"]["uuid"]
                .as_str()
                .unwrap(),
            bundle.resource_type.uuid()
        );
        assert_eq!(account["spec"]["resources"]["type"], CUSTOM_PROVIDER);
    }

    #[test]
    fn test_provider_auth_schema_is_cleared_stamped_and_marked() {
        let registry = schema::build_registry();
        let account = credential_provider_account();

        let AccountPayload::CredentialProvider(bundle) =
            compile_account(&account, &registry).unwrap()
        else {
            panic!("expected a credential provider bundle");
        };

        let provider = bundle.provider.into_value();
        let auth_schema = provider["spec"]["resources"]["auth_schema_list"]
            .as_array()
            .unwrap();
        assert_eq!(auth_schema.len(), 2);
        for entry in auth_schema {
            assert_eq!(entry["value"], "");
            assert!(!entry["uuid"].as_str().unwrap().is_empty());
        }
        let token = auth_schema.iter().find(|e| e["name"] == "token").unwrap();
        assert_eq!(token["attrs"]["is_secret_modified"], true);
        let username = auth_schema.iter().find(|e| e["name"] == "username").unwrap();
        assert!(username.get("attrs").is_none());
    }

    #[test]
    fn test_resource_type_variables_and_actions_are_stamped() {
        let registry = schema::build_registry();
        let account = credential_provider_account();

        let AccountPayload::CredentialProvider(bundle) =
            compile_account(&account, &registry).unwrap()
        else {
            panic!("expected a credential provider bundle");
        };

        let rt = bundle.resource_type.into_value();
        let resources = &rt["spec"]["resources"];

        let variables = resources["variable_list"].as_array().unwrap();
        assert_eq!(variables.len(), 2);
        let api_key = variables.iter().find(|v| v["name"] == "api_key").unwrap();
        assert_eq!(api_key["attrs"]["is_secret_modified"], true);

        let schema_list = resources["schema_list"].as_array().unwrap();
        assert_eq!(schema_list.len(), 1);
        assert_eq!(schema_list[0]["attrs"]["type"], "SECRET");

        let actions = resources["action_list"].as_array().unwrap();
        assert!(!actions[0]["uuid"].as_str().unwrap().is_empty());
        assert!(
            !actions[0]["child_tasks"][0]["uuid"]
                .as_str()
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_account_variable_list_comes_from_auth_schema() {
        let registry = schema::build_registry();
        let account = credential_provider_account();

        let AccountPayload::CredentialProvider(bundle) =
            compile_account(&account, &registry).unwrap()
        else {
            panic!("expected a credential provider bundle");
        };

        let account = bundle.account.into_value();
        let variables = account["spec"]["resources"]["data"]["variable_list"]
            .as_array()
            .unwrap();
        assert_eq!(variables.len(), 2);
        let token = variables.iter().find(|v| v["name"] == "token").unwrap();
        assert_eq!(token["attrs"]["is_secret_modified"], true);
        assert!(!token["uuid"].as_str().unwrap().is_empty());
    }
}
