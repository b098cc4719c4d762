//! Structural parser: raw JSON document → classified Resource tree.
//!
//! Given a canonical path and raw document bytes, produces a Resource tree
//! that classifies every field into one of the four Property variants or
//! promotes it to a Child. Idempotent and pure; performs no I/O.
//!
//! Classification is applied top-down, stopping at the first matching rule:
//! 1. Top-level `@odata.*` keys are metadata (`@odata.id`/`@odata.type`
//!    populate resource identity; other `@odata.*` keys are dropped).
//! 2. Link-only objects (`@odata.id` present, all other keys `@odata.*`)
//!    become Children.
//! 3. A `Members` array of link-only objects explodes into one Child per
//!    element, named by the last path segment of its target.
//! 4. Everything else becomes a Property, recursively classified.

use crate::error::Error;
use crate::model::{Child, Property, Resource};
use crate::path;
use crate::timestamp::Timestamp;
use serde_json::Value;
use std::collections::BTreeMap;

const ODATA_PREFIX: &str = "@odata.";

fn is_odata_key(key: &str) -> bool {
    key.starts_with(ODATA_PREFIX)
}

/// An object is a link-only reference iff it has a string `@odata.id` and
/// every other key begins with `@odata.`.
fn link_only_target(obj: &serde_json::Map<String, Value>) -> Option<String> {
    let id = obj.get("@odata.id")?.as_str()?;
    if obj.keys().all(|k| k == "@odata.id" || is_odata_key(k)) {
        Some(id.to_string())
    } else {
        None
    }
}

fn is_link_field_name(name: &str) -> bool {
    name.ends_with("Uri") || name.ends_with("URI") || name == "target" || name == "@Redfish.ActionInfo"
}

/// Parse a raw JSON document into a classified Resource.
pub fn parse(path: &str, bytes: &[u8], fetched_at: Timestamp) -> Result<Resource, Error> {
    let value: Value = serde_json::from_slice(bytes)?;
    let obj = value
        .as_object()
        .ok_or_else(|| Error::InvalidPath(format!("document at {path} is not a JSON object")))?;

    let canonical_path = obj
        .get("@odata.id")
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .unwrap_or_else(|| path.to_string());
    let odata_type = obj.get("@odata.type").and_then(Value::as_str).map(ToString::to_string);

    let mut properties = BTreeMap::new();
    let mut children = BTreeMap::new();

    for (key, val) in obj {
        if is_odata_key(key) {
            continue;
        }
        if key == "Members" {
            if let Some(arr) = val.as_array() {
                if !arr.is_empty() && arr.iter().all(|el| el.as_object().and_then(link_only_target).is_some()) {
                    for el in arr {
                        let target = link_only_target(el.as_object().unwrap()).unwrap();
                        let name = path::last_segment(&target).to_string();
                        children.insert(name.clone(), Child::new(name, target, canonical_path.clone()));
                    }
                    continue;
                }
            }
        }
        if let Some(obj_val) = val.as_object() {
            if let Some(target) = link_only_target(obj_val) {
                children.insert(key.clone(), Child::new(key.clone(), target, canonical_path.clone()));
                continue;
            }
        }
        let prop = classify_field(key, val)?;
        properties.insert(key.clone(), prop);
    }

    Ok(Resource {
        path: canonical_path,
        odata_type,
        raw_bytes: bytes.to_vec(),
        properties,
        children,
        fetched_at,
    })
}

/// Classify one non-metadata, non-child field into a Property.
fn classify_field(name: &str, val: &Value) -> Result<Property, Error> {
    match val {
        Value::Object(obj) => {
            if let Some(target) = link_only_target(obj) {
                return Ok(Property::link(name, val.clone(), target));
            }
            let mut children = BTreeMap::new();
            for (k, v) in obj {
                if is_odata_key(k) {
                    continue;
                }
                children.insert(k.clone(), classify_field(k, v)?);
            }
            Ok(Property::object(name, val.clone(), children))
        }
        Value::Array(arr) => {
            let mut elements = Vec::with_capacity(arr.len());
            for (i, el) in arr.iter().enumerate() {
                elements.push(classify_field(&format!("[{i}]"), el)?);
            }
            Ok(Property::array(name, val.clone(), elements))
        }
        Value::String(s) if is_link_field_name(name) && s.starts_with('/') => {
            Ok(Property::link(name, val.clone(), s.clone()))
        }
        other => Ok(Property::simple(name, val.clone(), other.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts() -> Timestamp {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn parses_identity_and_drops_other_odata_keys() {
        let doc = json!({
            "@odata.id": "/redfish/v1/Systems/1",
            "@odata.type": "#ComputerSystem.v1_0_0.ComputerSystem",
            "@odata.context": "/redfish/v1/$metadata#Systems/Members/$entity",
        });
        let r = parse("/redfish/v1/Systems/1", doc.to_string().as_bytes(), ts()).unwrap();
        assert_eq!(r.path, "/redfish/v1/Systems/1");
        assert_eq!(r.odata_type.as_deref(), Some("#ComputerSystem.v1_0_0.ComputerSystem"));
        assert!(r.properties.is_empty());
        assert!(r.children.is_empty());
    }

    #[test]
    fn link_only_object_becomes_child() {
        let doc = json!({
            "@odata.id": "/redfish/v1",
            "Systems": {"@odata.id": "/redfish/v1/Systems"},
        });
        let r = parse("/redfish/v1", doc.to_string().as_bytes(), ts()).unwrap();
        assert!(r.properties.is_empty());
        let child = r.children.get("Systems").unwrap();
        assert_eq!(child.target, "/redfish/v1/Systems");
    }

    #[test]
    fn members_array_explodes_into_children() {
        let doc = json!({
            "@odata.id": "/redfish/v1/Systems",
            "Members": [
                {"@odata.id": "/redfish/v1/Systems/1"},
                {"@odata.id": "/redfish/v1/Systems/2"},
            ],
        });
        let r = parse("/redfish/v1/Systems", doc.to_string().as_bytes(), ts()).unwrap();
        assert_eq!(r.children.len(), 2);
        assert_eq!(r.children.get("1").unwrap().target, "/redfish/v1/Systems/1");
        assert_eq!(r.children.get("2").unwrap().target, "/redfish/v1/Systems/2");
    }

    #[test]
    fn object_with_data_and_id_is_not_link_only() {
        // Has a non-@odata key alongside @odata.id -> not link-only, recurse as PropertyObject
        let doc = json!({
            "@odata.id": "/redfish/v1/Systems/1",
            "Status": {"@odata.id": "ignored-if-present", "State": "Enabled", "Health": "OK"},
        });
        let r = parse("/redfish/v1/Systems/1", doc.to_string().as_bytes(), ts()).unwrap();
        let status = r.properties.get("Status").unwrap();
        assert!(matches!(status.kind, crate::model::PropertyKind::Object(_)));
    }

    #[test]
    fn uri_suffixed_string_becomes_property_link() {
        let doc = json!({
            "@odata.id": "/redfish/v1/Systems/1",
            "SerialConsole": {"ServiceEnabled": true},
            "target": "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset",
        });
        let r = parse("/redfish/v1/Systems/1", doc.to_string().as_bytes(), ts()).unwrap();
        let target_prop = r.properties.get("target").unwrap();
        assert!(matches!(&target_prop.kind, crate::model::PropertyKind::Link(t) if t == "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset"));
    }

    #[test]
    fn scheme_prefixed_uri_stays_simple() {
        let doc = json!({
            "@odata.id": "/redfish/v1/Systems/1",
            "ManagementUri": "https://example.com/manage",
        });
        let r = parse("/redfish/v1/Systems/1", doc.to_string().as_bytes(), ts()).unwrap();
        let prop = r.properties.get("ManagementUri").unwrap();
        assert!(matches!(prop.kind, crate::model::PropertyKind::Simple(_)));
    }

    #[test]
    fn array_elements_named_by_index() {
        let doc = json!({
            "@odata.id": "/redfish/v1/Systems/1",
            "Boot": {"BootOrder": ["Pxe", "Hdd", "Usb"]},
        });
        let r = parse("/redfish/v1/Systems/1", doc.to_string().as_bytes(), ts()).unwrap();
        let boot = r.properties.get("Boot").unwrap();
        let children = boot.children().unwrap();
        let order = children.get("BootOrder").unwrap();
        let elements = order.children().unwrap();
        assert_eq!(elements.len(), 3);
        assert!(elements.contains_key("[0]"));
        assert!(elements.contains_key("[2]"));
    }

    #[test]
    fn redfish_and_message_annotations_preserved_as_data() {
        let doc = json!({
            "@odata.id": "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset",
            "ResetType@Redfish.AllowableValues": ["On", "ForceOff"],
        });
        let r = parse("/redfish/v1/Systems/1/Actions/ComputerSystem.Reset", doc.to_string().as_bytes(), ts()).unwrap();
        assert!(r.properties.contains_key("ResetType@Redfish.AllowableValues"));
    }

    #[test]
    fn rejects_non_object_top_level() {
        let err = parse("/redfish/v1", b"[1,2,3]", ts()).unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }

    #[test]
    fn raw_bytes_are_preserved_verbatim() {
        let bytes = br#"{"@odata.id":"/redfish/v1","Systems":{"@odata.id":"/redfish/v1/Systems"}}"#;
        let r = parse("/redfish/v1", bytes, ts()).unwrap();
        assert_eq!(r.raw_bytes, bytes);
    }
}
