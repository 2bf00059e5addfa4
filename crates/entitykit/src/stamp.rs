//! Reference stamping for nested payload elements
//!
//! Auth-schema entries, variables, and actions are submitted as lists whose
//! elements each need a unique identifier. Stamping walks a list (and any
//! nested element lists under it), assigns a fresh UUID to every element
//! lacking one, and records a call-scoped name-to-identifier map so that
//! references elsewhere in the same tree resolve to the stamped identifiers.

use crate::types::JsonMap;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Secret marker attached alongside secret values; the remote side treats
/// the supplied value, not its redacted placeholder, as authoritative.
pub const SECRET_TYPE: &str = "SECRET";

/// State scoped to a single stamping call
#[derive(Debug, Default)]
pub struct StampContext {
    name_uuid: HashMap<String, String>,
}

impl StampContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier recorded for a named element in this call, if any.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.name_uuid.get(name).map(String::as_str)
    }

    fn record(&mut self, name: &str, uuid: &str) {
        self.name_uuid
            .entry(name.to_string())
            .or_insert_with(|| uuid.to_string());
    }
}

/// Stamp every element of a list with a unique identifier.
///
/// Idempotent within one call: an element already carrying a non-empty
/// `uuid` keeps it. Identifiers are regenerated on every compile of the same
/// source definition, so callers updating an existing remote object must
/// reconcile identifiers server-side.
pub fn stamp_list(items: &mut [Value], ctx: &mut StampContext) {
    for item in items.iter_mut() {
        if let Value::Object(map) = item {
            stamp_element(map, ctx);
        }
    }
    for item in items.iter_mut() {
        if let Value::Object(map) = item {
            resolve_references(map, ctx);
        }
    }
}

fn stamp_element(map: &mut JsonMap, ctx: &mut StampContext) {
    let name = map
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string);
    let existing = map
        .get("uuid")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .map(str::to_string);

    let uuid = match existing {
        Some(uuid) => uuid,
        None => {
            let uuid = Uuid::new_v4().to_string();
            map.insert("uuid".to_string(), Value::String(uuid.clone()));
            uuid
        }
    };
    if let Some(name) = &name {
        ctx.record(name, &uuid);
    }

    // Nested element lists (sub-actions, child tasks) are stamped in place.
    for value in map.values_mut() {
        if let Value::Array(items) = value
            && items.iter().any(Value::is_object)
        {
            for item in items.iter_mut() {
                if let Value::Object(child) = item {
                    stamp_element(child, ctx);
                }
            }
        }
    }
}

/// Fill in identifiers on reference objects (`{kind, name}` without a uuid)
/// that point at elements stamped earlier in the same call.
fn resolve_references(map: &mut JsonMap, ctx: &StampContext) {
    for value in map.values_mut() {
        match value {
            Value::Object(child) => {
                if let Some(uuid) = reference_target(child, ctx) {
                    child.insert("uuid".to_string(), Value::String(uuid));
                }
                resolve_references(child, ctx);
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    if let Value::Object(child) = item {
                        if let Some(uuid) = reference_target(child, ctx) {
                            child.insert("uuid".to_string(), Value::String(uuid));
                        }
                        resolve_references(child, ctx);
                    }
                }
            }
            _ => {}
        }
    }
}

fn reference_target(map: &JsonMap, ctx: &StampContext) -> Option<String> {
    if !map.contains_key("kind") {
        return None;
    }
    let missing_uuid = map
        .get("uuid")
        .and_then(Value::as_str)
        .is_none_or(str::is_empty);
    if !missing_uuid {
        return None;
    }
    let name = map.get("name").and_then(Value::as_str)?;
    ctx.lookup(name).map(str::to_string)
}

/// Attach the secret marker to a SECRET-typed mapping.
pub fn mark_secret(map: &mut JsonMap) {
    if map.get("type").and_then(Value::as_str) == Some(SECRET_TYPE) {
        let mut attrs = JsonMap::new();
        attrs.insert("is_secret_modified".to_string(), Value::Bool(true));
        attrs.insert("type".to_string(), Value::String(SECRET_TYPE.to_string()));
        map.insert("attrs".to_string(), Value::Object(attrs));
    }
}

/// Attach the secret marker to every SECRET-typed element of a list.
pub fn mark_secrets(items: &mut [Value]) {
    for item in items {
        if let Value::Object(map) = item {
            mark_secret(map);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stamp_assigns_unique_identifiers() {
        let mut items = vec![
            json!({"name": "login"}),
            json!({"name": "logout"}),
            json!({"name": "refresh"}),
        ];
        let mut ctx = StampContext::new();
        stamp_list(&mut items, &mut ctx);

        assert_eq!(items.len(), 3);
        let uuids: Vec<&str> = items
            .iter()
            .map(|i| i["uuid"].as_str().unwrap())
            .collect();
        assert!(uuids.iter().all(|u| !u.is_empty()));
        assert_ne!(uuids[0], uuids[1]);
        assert_ne!(uuids[1], uuids[2]);
        assert_ne!(uuids[0], uuids[2]);
    }

    #[test]
    fn test_stamp_is_idempotent_within_call() {
        let mut items = vec![json!({"name": "login", "uuid": "pre-assigned"})];
        let mut ctx = StampContext::new();
        stamp_list(&mut items, &mut ctx);
        assert_eq!(items[0]["uuid"], "pre-assigned");
        assert_eq!(ctx.lookup("login"), Some("pre-assigned"));
    }

    #[test]
    fn test_stamp_recurses_into_nested_lists() {
        let mut items = vec![json!({
            "name": "deploy",
            "child_tasks": [
                {"name": "fetch"},
                {"name": "unpack", "child_tasks": [{"name": "verify"}]}
            ]
        })];
        let mut ctx = StampContext::new();
        stamp_list(&mut items, &mut ctx);

        assert!(items[0]["uuid"].as_str().is_some());
        assert!(items[0]["child_tasks"][0]["uuid"].as_str().is_some());
        assert!(items[0]["child_tasks"][1]["child_tasks"][0]["uuid"].as_str().is_some());
    }

    #[test]
    fn test_references_resolve_to_stamped_elements() {
        let mut items = vec![
            json!({"name": "login"}),
            json!({
                "name": "session",
                "target_reference": {"kind": "action", "name": "login"}
            }),
        ];
        let mut ctx = StampContext::new();
        stamp_list(&mut items, &mut ctx);

        let login_uuid = items[0]["uuid"].as_str().unwrap();
        assert_eq!(
            items[1]["target_reference"]["uuid"].as_str().unwrap(),
            login_uuid
        );
    }

    #[test]
    fn test_mark_secrets_only_touches_secret_entries() {
        let mut items = vec![
            json!({"name": "password", "type": "SECRET"}),
            json!({"name": "username", "type": "LOCAL"}),
        ];
        mark_secrets(&mut items);

        assert_eq!(items[0]["attrs"]["is_secret_modified"], true);
        assert_eq!(items[0]["attrs"]["type"], "SECRET");
        assert!(items[1].get("attrs").is_none());
    }
}
