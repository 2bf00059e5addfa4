//! Field validators
//!
//! A validator is a pure function from a candidate value to a normalized
//! value, selected by the field's declared capability. Validation either
//! returns the normalized value or fails with the field name and reason;
//! nothing is coerced silently.

use crate::error::{Error, Result};
use crate::registry::{FieldDescriptor, FieldKind};
use crate::stamp;
use crate::types::JsonMap;
use serde_json::Value;

/// Validate a candidate value against its field descriptor.
pub fn validate(descriptor: &FieldDescriptor, value: Value) -> Result<Value> {
    match descriptor.kind {
        FieldKind::String => expect(descriptor, value, "a string", Value::is_string),
        FieldKind::Int => expect(descriptor, value, "an integer", Value::is_i64),
        FieldKind::Bool => expect(descriptor, value, "a boolean", Value::is_boolean),
        FieldKind::Dict | FieldKind::Spec | FieldKind::Entity => {
            expect(descriptor, value, "a mapping", Value::is_object)
        }
        FieldKind::StringList => expect_list(descriptor, value, "strings", Value::is_string),
        FieldKind::DictList | FieldKind::EntityList => {
            expect_list(descriptor, value, "mappings", Value::is_object)
        }
        FieldKind::Reference => validate_reference(descriptor, value),
        FieldKind::ReferenceList => validate_reference_list(descriptor, value),
        FieldKind::Secret => normalize_secret(descriptor, value),
        FieldKind::QuotaMap => validate_quota(descriptor, value),
    }
}

fn expect(
    descriptor: &FieldDescriptor,
    value: Value,
    expected: &str,
    check: fn(&Value) -> bool,
) -> Result<Value> {
    if check(&value) {
        Ok(value)
    } else {
        Err(Error::validation(
            &descriptor.name,
            format!("expected {expected}, got {}", kind_of(&value)),
        ))
    }
}

fn expect_list(
    descriptor: &FieldDescriptor,
    value: Value,
    element: &str,
    check: fn(&Value) -> bool,
) -> Result<Value> {
    let Value::Array(items) = &value else {
        return Err(Error::validation(
            &descriptor.name,
            format!("expected a list of {element}, got {}", kind_of(&value)),
        ));
    };
    if let Some(bad) = items.iter().find(|item| !check(item)) {
        return Err(Error::validation(
            &descriptor.name,
            format!("expected a list of {element}, found {}", kind_of(bad)),
        ));
    }
    Ok(value)
}

/// A reference is a mapping carrying `kind` plus at least a `name` or `uuid`.
fn validate_reference(descriptor: &FieldDescriptor, value: Value) -> Result<Value> {
    let Value::Object(map) = &value else {
        return Err(Error::validation(
            &descriptor.name,
            format!("expected a reference mapping, got {}", kind_of(&value)),
        ));
    };
    check_reference(descriptor, map)?;
    Ok(value)
}

fn validate_reference_list(descriptor: &FieldDescriptor, value: Value) -> Result<Value> {
    let Value::Array(items) = &value else {
        return Err(Error::validation(
            &descriptor.name,
            format!("expected a list of references, got {}", kind_of(&value)),
        ));
    };
    for item in items {
        let Value::Object(map) = item else {
            return Err(Error::validation(
                &descriptor.name,
                format!("expected a reference mapping, found {}", kind_of(item)),
            ));
        };
        check_reference(descriptor, map)?;
    }
    Ok(value)
}

fn check_reference(descriptor: &FieldDescriptor, map: &JsonMap) -> Result<()> {
    if map.get("kind").and_then(Value::as_str).is_none() {
        return Err(Error::validation(
            &descriptor.name,
            "reference is missing 'kind'",
        ));
    }
    let named = map.get("name").and_then(Value::as_str).is_some();
    let identified = map.get("uuid").and_then(Value::as_str).is_some();
    if !named && !identified {
        return Err(Error::validation(
            &descriptor.name,
            "reference needs a 'name' or 'uuid'",
        ));
    }
    Ok(())
}

/// Normalize a secret declaration to the wire shape.
///
/// A bare string becomes `{value, type: "SECRET"}`; a mapping keeps its
/// fields. Either way the compiled output carries the secret marker, which
/// tells the remote side the supplied value overrides the stored one.
fn normalize_secret(descriptor: &FieldDescriptor, value: Value) -> Result<Value> {
    let mut map = match value {
        Value::String(s) => {
            let mut map = JsonMap::new();
            map.insert("value".to_string(), Value::String(s));
            map
        }
        Value::Object(map) => map,
        other => {
            return Err(Error::validation(
                &descriptor.name,
                format!("expected a secret string or mapping, got {}", kind_of(&other)),
            ));
        }
    };
    map.entry("type")
        .or_insert_with(|| Value::String(stamp::SECRET_TYPE.to_string()));
    if map.get("type").and_then(Value::as_str) != Some(stamp::SECRET_TYPE) {
        return Err(Error::validation(
            &descriptor.name,
            "secret field declares a non-secret type",
        ));
    }
    stamp::mark_secret(&mut map);
    Ok(Value::Object(map))
}

/// A quota map keys resource names to non-negative integer amounts.
fn validate_quota(descriptor: &FieldDescriptor, value: Value) -> Result<Value> {
    let Value::Object(map) = &value else {
        return Err(Error::validation(
            &descriptor.name,
            format!("expected a quota mapping, got {}", kind_of(&value)),
        ));
    };
    for (resource, amount) in map {
        if amount.as_u64().is_none() {
            return Err(Error::validation(
                &descriptor.name,
                format!("quota for '{resource}' must be a non-negative integer"),
            ));
        }
    }
    Ok(value)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
