//! Provider specification validation
//!
//! A substrate declares its target provider type independently from the spec
//! blob that describes how to provision on that platform. Both must agree
//! before either is sent to the remote API; afterwards the spec body is
//! handed to a platform-specific validator for structural checks.

use entitykit::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;

/// Spec kind assumed when the blob does not declare one
pub const DEFAULT_SPEC_KIND: &str = "PROVISION_AHV_VM";

/// Fixed mapping from declared spec kind to canonical provider type
const SPEC_PROVIDER_MAP: &[(&str, &str)] = &[
    ("PROVISION_AHV_VM", "AHV_VM"),
    ("PROVISION_VMWARE_VM", "VMWARE_VM"),
    ("PROVISION_GCP_VM", "GCP_VM"),
    ("PROVISION_EXISTING_MACHINE", "EXISTING_VM"),
    ("PROVISION_AWS_VM", "AWS_VM"),
    ("PROVISION_AZURE_VM", "AZURE_VM"),
];

/// Canonical provider type for a declared spec kind.
pub fn provider_type_for(spec_kind: &str) -> Option<&'static str> {
    SPEC_PROVIDER_MAP
        .iter()
        .find(|(kind, _)| *kind == spec_kind)
        .map(|(_, provider)| *provider)
}

/// Structural validator for one provider platform
pub trait SpecValidator: Send + Sync {
    /// The provider type this validator handles.
    fn provider_type(&self) -> &'static str;

    /// Check the spec body's structure.
    fn validate_spec(&self, spec: &Value) -> Result<()>;
}

/// Validator requiring a `resources` mapping with a set of platform keys
struct ResourceSpecValidator {
    provider_type: &'static str,
    required: &'static [&'static str],
}

impl SpecValidator for ResourceSpecValidator {
    fn provider_type(&self) -> &'static str {
        self.provider_type
    }

    fn validate_spec(&self, spec: &Value) -> Result<()> {
        let resources = spec
            .get("resources")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                Error::validation(
                    "resources",
                    format!("{} spec needs a 'resources' mapping", self.provider_type),
                )
            })?;
        for key in self.required {
            if !resources.contains_key(*key) {
                return Err(Error::validation(
                    key,
                    format!("required by {} specs", self.provider_type),
                ));
            }
        }
        Ok(())
    }
}

/// Registry of spec validators keyed by provider type
pub struct SpecValidatorSet {
    validators: HashMap<&'static str, Box<dyn SpecValidator>>,
}

impl SpecValidatorSet {
    /// Validators for every built-in platform.
    pub fn builtin() -> Self {
        let mut set = Self {
            validators: HashMap::new(),
        };
        set.register(Box::new(ResourceSpecValidator {
            provider_type: "AHV_VM",
            required: &["nic_list", "disk_list"],
        }));
        set.register(Box::new(ResourceSpecValidator {
            provider_type: "VMWARE_VM",
            required: &[],
        }));
        set.register(Box::new(ResourceSpecValidator {
            provider_type: "GCP_VM",
            required: &[],
        }));
        set.register(Box::new(ResourceSpecValidator {
            provider_type: "EXISTING_VM",
            required: &["address"],
        }));
        set.register(Box::new(ResourceSpecValidator {
            provider_type: "AWS_VM",
            required: &[],
        }));
        set.register(Box::new(ResourceSpecValidator {
            provider_type: "AZURE_VM",
            required: &[],
        }));
        set
    }

    /// Register a validator, replacing any existing one for its type.
    pub fn register(&mut self, validator: Box<dyn SpecValidator>) {
        self.validators.insert(validator.provider_type(), validator);
    }

    pub fn get(&self, provider_type: &str) -> Option<&dyn SpecValidator> {
        self.validators
            .get(provider_type)
            .map(|validator| validator.as_ref())
    }
}

impl Default for SpecValidatorSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A raw provider specification blob
#[derive(Debug, Clone)]
pub struct ProviderSpec {
    spec: Value,
}

impl ProviderSpec {
    pub fn new(spec: Value) -> Self {
        Self { spec }
    }

    /// The declared spec kind, defaulting when absent.
    pub fn spec_kind(&self) -> &str {
        self.spec
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_SPEC_KIND)
    }

    pub fn as_value(&self) -> &Value {
        &self.spec
    }

    /// Validate this spec against a substrate's declared provider type.
    ///
    /// Resolves the declared spec kind to a canonical provider type, checks
    /// it equals the substrate's, then delegates structural validation to
    /// the platform validator. `context` names the substrate for error
    /// reporting.
    pub fn validate(
        &self,
        validators: &SpecValidatorSet,
        substrate_provider_type: &str,
        context: &str,
    ) -> Result<&Value> {
        let spec_kind = self.spec_kind();
        let spec_type = provider_type_for(spec_kind).ok_or_else(|| {
            Error::validation("type", format!("unknown spec kind '{spec_kind}'"))
        })?;

        if spec_type != substrate_provider_type {
            return Err(Error::ProviderTypeMismatch {
                substrate_type: substrate_provider_type.to_string(),
                spec_type: spec_type.to_string(),
                context: context.to_string(),
            });
        }

        let validator = validators.get(substrate_provider_type).ok_or_else(|| {
            Error::validation(
                "type",
                format!("no spec validator registered for '{substrate_provider_type}'"),
            )
        })?;
        validator.validate_spec(&self.spec)?;

        log::debug!("validated {spec_kind} spec for substrate '{context}'");
        Ok(&self.spec)
    }
}
