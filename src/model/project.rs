//! Project compile hook
//!
//! A project declaration carries a list of provider blocks; the remote API
//! instead wants flat account/subnet/network reference lists and a resource
//! domain. The hook performs that restructuring after field validation.

use entitykit::error::{Error, Result};
use entitykit::types::JsonMap;
use serde_json::{Value, json};

/// Bytes per gibibyte; quota amounts are declared in GiB but submitted in
/// bytes.
pub const GIB: i64 = 1_073_741_824;

/// The one quota resource submitted as a raw count rather than a byte size.
pub const CPU_RESOURCE: &str = "VCPUS";

/// Provider type whose subnet and network lists roll up to the project.
pub const NUTANIX_PC: &str = "nutanix_pc";

/// Flatten provider blocks and convert quotas.
///
/// - every provider contributes its `account_reference` to
///   `account_reference_list`
/// - `nutanix_pc` providers additionally contribute `subnet_reference_list`,
///   `external_network_list`, and (last one wins) `default_subnet_reference`
/// - `quotas` becomes `resource_domain.resources`, scaling every non-CPU
///   amount from GiB to bytes
/// - `environment_definition_list` is meaningless to the remote API and is
///   dropped
pub fn compile_hook(mut fields: JsonMap) -> Result<JsonMap> {
    let providers = match fields.shift_remove("provider_list") {
        Some(Value::Array(providers)) => providers,
        _ => Vec::new(),
    };

    let mut account_refs = Vec::with_capacity(providers.len());
    let mut subnet_refs = Vec::new();
    let mut external_networks = Vec::new();
    let mut default_subnet = None;

    for provider in &providers {
        let Value::Object(provider) = provider else {
            continue;
        };
        if provider.get("provider_type").and_then(Value::as_str) == Some(NUTANIX_PC) {
            if let Some(Value::Array(subnets)) = provider.get("subnet_reference_list") {
                subnet_refs.extend(subnets.iter().cloned());
            }
            if let Some(Value::Array(networks)) = provider.get("external_network_list") {
                external_networks.extend(networks.iter().cloned());
            }
            if let Some(subnet) = provider.get("default_subnet_reference") {
                default_subnet = Some(subnet.clone());
            }
        }
        if let Some(reference) = provider.get("account_reference") {
            account_refs.push(reference.clone());
        }
    }

    log::debug!(
        "project hook: {} providers -> {} account references",
        providers.len(),
        account_refs.len()
    );

    fields.insert(
        "account_reference_list".to_string(),
        Value::Array(account_refs),
    );
    if !subnet_refs.is_empty() {
        fields.insert("subnet_reference_list".to_string(), Value::Array(subnet_refs));
    }
    if !external_networks.is_empty() {
        fields.insert(
            "external_network_list".to_string(),
            Value::Array(external_networks),
        );
    }
    if let Some(subnet) = default_subnet {
        fields.insert("default_subnet_reference".to_string(), subnet);
    }

    if let Some(Value::Object(quotas)) = fields.shift_remove("quotas") {
        let mut resources = Vec::with_capacity(quotas.len());
        for (resource, amount) in quotas {
            let amount = amount.as_i64().ok_or_else(|| {
                Error::validation("quotas", format!("quota for '{resource}' is out of range"))
            })?;
            let limit = if resource == CPU_RESOURCE {
                amount
            } else {
                amount.checked_mul(GIB).ok_or_else(|| {
                    Error::validation("quotas", format!("quota for '{resource}' overflows"))
                })?
            };
            resources.push(json!({"limit": limit, "resource_type": resource}));
        }
        fields.insert(
            "resource_domain".to_string(),
            json!({"resources": resources}),
        );
    }

    fields.shift_remove("environment_definition_list");

    Ok(fields)
}
