//! Action model: extracting invocable actions from a resource's `Actions`
//! property and coercing consumer-supplied string parameters into typed
//! JSON for the POST body.

use crate::model::{Property, PropertyKind, Resource};
use std::collections::BTreeMap;

/// One action discovered under a resource's `Actions` property.
#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    pub target: String,
    pub action_info: Option<String>,
    /// Parameter name → allowed string values, from
    /// `<Param>@Redfish.AllowableValues` fields.
    pub allowable_values: BTreeMap<String, Vec<String>>,
}

const ALLOWABLE_SUFFIX: &str = "@Redfish.AllowableValues";

/// Discover every action nested under `resource`'s `Actions` property, if
/// present.
pub fn discover(resource: &Resource) -> Vec<Action> {
    let Some(actions_prop) = resource.properties.get("Actions") else {
        return Vec::new();
    };
    let PropertyKind::Object(entries) = &actions_prop.kind else {
        return Vec::new();
    };

    let mut actions = Vec::new();
    for (name, entry) in entries {
        let PropertyKind::Object(fields) = &entry.kind else { continue };
        let Some(target) = link_field(fields, "target") else { continue };
        let action_info = link_field(fields, "@Redfish.ActionInfo");

        let mut allowable_values = BTreeMap::new();
        for (field_name, field) in fields {
            if let Some(param) = field_name.strip_suffix(ALLOWABLE_SUFFIX) {
                if let PropertyKind::Array(elements) = &field.kind {
                    let values: Vec<String> = elements
                        .iter()
                        .filter_map(|p| match &p.kind {
                            PropertyKind::Simple(serde_json::Value::String(s)) => Some(s.clone()),
                            _ => None,
                        })
                        .collect();
                    allowable_values.insert(param.to_string(), values);
                }
            }
        }

        actions.push(Action { name: name.clone(), target, action_info, allowable_values });
    }
    actions
}

fn link_field(fields: &BTreeMap<String, Property>, name: &str) -> Option<String> {
    match fields.get(name)?.kind.clone() {
        PropertyKind::Link(target) => Some(target),
        _ => None,
    }
}

/// Coerce a string parameter value into typed JSON: integer, float,
/// boolean literal `true`/`false`, otherwise string.
pub fn coerce_value(raw: &str) -> serde_json::Value {
    if raw == "true" {
        return serde_json::Value::Bool(true);
    }
    if raw == "false" {
        return serde_json::Value::Bool(false);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return serde_json::Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return serde_json::Value::from(f);
    }
    serde_json::Value::String(raw.to_string())
}

/// Build the JSON POST body for invoking an action from consumer-supplied
/// string parameters.
pub fn build_body(params: &BTreeMap<String, String>) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> =
        params.iter().map(|(k, v)| (k.clone(), coerce_value(v))).collect();
    serde_json::Value::Object(map)
}
