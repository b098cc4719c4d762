//! Path resolver: interpret a path expression against a base path.
//!
//! The resolver walks segments left to right in one of two modes —
//! *resource mode* (sitting at a standalone resource, consulting the
//! cache) and *property mode* (inside a property subtree, consulting an
//! in-memory map). A non-terminal segment that resolves to a PropertyLink
//! transparently follows the link, dropping back into resource mode at
//! the link's target; a non-terminal segment on a PropertyObject descends
//! into its children in property mode. Terminal Simple or unindexed-Array
//! segments mid-path fail with `NavigateIntoScalar`.

use crate::error::{Error, Result};
use crate::model::{Property, PropertyKind, Resource, Target};
use crate::path::{self, Segment};
use crate::transport::FetchClient;
use crate::cache::Cache;
use std::sync::Arc;

enum Pos {
    Resource(String),
    Property { resource: Arc<Resource>, resource_path: String, property: Property },
}

/// Resolve `target` relative to `base`. An empty target returns the
/// Target for `base` itself; an absolute target ignores `base` entirely.
pub fn resolve_target<C: FetchClient>(cache: &Cache<C>, base: &str, target: &str) -> Result<Target> {
    if target.is_empty() {
        return resolve_path(cache, base);
    }
    if target.starts_with('/') {
        return resolve_path(cache, target);
    }
    let base_target = resolve_path(cache, base)?;
    let pos = target_to_pos(base_target);
    let segs = path::segments(target)?;
    walk(cache, pos, &segs)
}

/// Resolve a full absolute path from scratch, starting at the root.
pub fn resolve_path<C: FetchClient>(cache: &Cache<C>, full_path: &str) -> Result<Target> {
    path::require_under_root(full_path)?;
    let normalized = path::normalize(full_path);
    let remainder = normalized.strip_prefix(path::ROOT).unwrap_or("").trim_start_matches('/');
    if remainder.is_empty() {
        let resource = cache.get(path::ROOT)?;
        return Ok(Target::Resource { resource: (*resource).clone(), path: path::ROOT.to_string() });
    }
    let segs = path::segments(remainder)?;
    walk(cache, Pos::Resource(path::ROOT.to_string()), &segs)
}

fn target_to_pos(target: Target) -> Pos {
    match target {
        Target::Resource { resource, path } => {
            let _ = resource;
            Pos::Resource(path)
        }
        Target::Property { resource, property, resource_path } => {
            Pos::Property { resource: Arc::new(resource), resource_path, property }
        }
        Target::Link { property, resource_path } => {
            // `resource_path` on a Target::Link holds the link's *target*
            // path; a link that is followed further drops back into
            // resource mode there.
            let _ = property;
            Pos::Resource(resource_path)
        }
    }
}

fn index_into(prop: &Property, index: Option<usize>) -> Result<Property> {
    match (&prop.kind, index) {
        (_, None) => Ok(prop.clone()),
        (PropertyKind::Array(elements), Some(i)) => {
            elements.get(i).cloned().ok_or(Error::IndexOutOfRange { index: i, len: elements.len() })
        }
        (_, Some(_)) => Err(Error::NavigateIntoScalar(prop.name.clone())),
    }
}

fn walk<C: FetchClient>(cache: &Cache<C>, mut pos: Pos, segs: &[Segment]) -> Result<Target> {
    for (i, seg) in segs.iter().enumerate() {
        let is_last = i == segs.len() - 1;
        pos = match pos {
            Pos::Resource(path) => {
                let resource = cache.get(&path)?;
                if let Some(child) = resource.children.get(&seg.name) {
                    if seg.index.is_some() {
                        return Err(Error::InvalidPath(format!("child '{}' cannot be indexed", seg.name)));
                    }
                    if is_last {
                        let next = cache.get(&child.target)?;
                        return Ok(Target::Resource { resource: (*next).clone(), path: child.target.clone() });
                    }
                    Pos::Resource(child.target.clone())
                } else if let Some(prop) = resource.properties.get(&seg.name) {
                    let selected = index_into(prop, seg.index)?;
                    if is_last {
                        return terminal_property(&resource, &path, selected);
                    }
                    Pos::Property { resource: Arc::clone(&resource), resource_path: path.clone(), property: selected }
                } else {
                    return Err(Error::NotFound(format!("{} under {}", seg.name, path)));
                }
            }
            Pos::Property { resource, resource_path, property } => {
                let children = property
                    .children()
                    .ok_or_else(|| Error::NavigateIntoScalar(format!("{}/{}", resource_path, property.name)))?;
                let child = children
                    .get(seg.name.as_str())
                    .ok_or_else(|| Error::NotFound(format!("{} under {}", seg.name, resource_path)))?;
                let selected = index_into(child, seg.index)?;
                if is_last {
                    return terminal_property(&resource, &resource_path, selected);
                }
                match &selected.kind {
                    PropertyKind::Link(target) => Pos::Resource(target.clone()),
                    PropertyKind::Object(_) => {
                        Pos::Property { resource: Arc::clone(&resource), resource_path: resource_path.clone(), property: selected }
                    }
                    _ => return Err(Error::NavigateIntoScalar(format!("{}/{}", resource_path, selected.name))),
                }
            }
        };
    }
    pos_to_target(cache, pos)
}

fn terminal_property(resource: &Resource, resource_path: &str, property: Property) -> Result<Target> {
    match &property.kind {
        PropertyKind::Link(target) => {
            Ok(Target::Link { property, resource_path: target.clone() })
        }
        _ => Ok(Target::Property {
            resource: resource.clone(),
            property,
            resource_path: resource_path.to_string(),
        }),
    }
}

fn pos_to_target<C: FetchClient>(cache: &Cache<C>, pos: Pos) -> Result<Target> {
    match pos {
        Pos::Resource(path) => {
            let resource = cache.get(&path)?;
            Ok(Target::Resource { resource: (*resource).clone(), path })
        }
        Pos::Property { resource, resource_path, property } => {
            terminal_property(&resource, &resource_path, property)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct FixtureClient {
        docs: HashMap<String, Vec<u8>>,
        fetches: RefCell<Vec<String>>,
    }

    impl FetchClient for FixtureClient {
        fn fetch(&self, path: &str) -> Result<Vec<u8>> {
            self.fetches.borrow_mut().push(path.to_string());
            self.docs.get(path).cloned().ok_or_else(|| Error::NotFound(path.to_string()))
        }

        fn post(&self, _path: &str, _body: serde_json::Value) -> Result<(Vec<u8>, u16)> {
            unimplemented!()
        }
    }

    fn fixture() -> Cache<FixtureClient> {
        let mut docs = HashMap::new();
        docs.insert(
            "/redfish/v1".to_string(),
            br#"{"@odata.id": "/redfish/v1", "Systems": {"@odata.id": "/redfish/v1/Systems"}}"#.to_vec(),
        );
        docs.insert(
            "/redfish/v1/Systems".to_string(),
            br#"{"@odata.id": "/redfish/v1/Systems", "Members": [{"@odata.id": "/redfish/v1/Systems/1"}]}"#.to_vec(),
        );
        docs.insert(
            "/redfish/v1/Systems/1".to_string(),
            br#"{
                "@odata.id": "/redfish/v1/Systems/1",
                "Status": {"State": "Enabled", "Health": "OK"},
                "Boot": {"BootOrder": ["Pxe", "Hdd", "Usb"]},
                "Links": {"Chassis": [{"@odata.id": "/redfish/v1/Chassis/1"}]}
            }"#
            .to_vec(),
        );
        docs.insert(
            "/redfish/v1/Chassis/1".to_string(),
            br#"{"@odata.id": "/redfish/v1/Chassis/1", "Name": "Chassis 1"}"#.to_vec(),
        );
        Cache::new(FixtureClient { docs, fetches: RefCell::new(Vec::new()) })
    }

    #[test]
    fn resolves_simple_property() {
        let cache = fixture();
        let target = resolve_target(&cache, "/redfish/v1/Systems/1", "Status/Health").unwrap();
        match target {
            Target::Property { property, .. } => {
                assert_eq!(property.kind, PropertyKind::Simple(serde_json::json!("OK")));
            }
            other => panic!("expected property target, got {other:?}"),
        }
    }

    #[test]
    fn resolves_array_index_and_rejects_out_of_range() {
        let cache = fixture();
        let target = resolve_target(&cache, "/redfish/v1/Systems/1", "Boot/BootOrder[0]").unwrap();
        match target {
            Target::Property { property, .. } => {
                assert_eq!(property.kind, PropertyKind::Simple(serde_json::json!("Pxe")));
            }
            other => panic!("expected property target, got {other:?}"),
        }
        let err = resolve_target(&cache, "/redfish/v1/Systems/1", "Boot/BootOrder[3]").unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn resolves_composite_path_through_two_resources() {
        let cache = fixture();
        let target = resolve_target(&cache, "/redfish/v1", "Systems/1/Status/Health").unwrap();
        match target {
            Target::Property { property, .. } => {
                assert_eq!(property.kind, PropertyKind::Simple(serde_json::json!("OK")));
            }
            other => panic!("expected property target, got {other:?}"),
        }
    }

    #[test]
    fn resolves_link_target() {
        let cache = fixture();
        let target = resolve_target(&cache, "/redfish/v1/Systems/1", "Links/Chassis[0]").unwrap();
        match target {
            Target::Link { resource_path, .. } => assert_eq!(resource_path, "/redfish/v1/Chassis/1"),
            other => panic!("expected link target, got {other:?}"),
        }
    }

    #[test]
    fn empty_target_returns_base() {
        let cache = fixture();
        let target = resolve_target(&cache, "/redfish/v1/Systems/1", "").unwrap();
        assert!(matches!(target, Target::Resource { path, .. } if path == "/redfish/v1/Systems/1"));
    }

    #[test]
    fn trailing_slash_does_not_change_result() {
        let cache = fixture();
        let a = resolve_target(&cache, "/redfish/v1/Systems/1", "Status/Health").unwrap();
        let b = resolve_target(&cache, "/redfish/v1/Systems/1", "Status/Health/").unwrap();
        match (a, b) {
            (Target::Property { property: pa, .. }, Target::Property { property: pb, .. }) => {
                assert_eq!(pa.kind, pb.kind);
            }
            _ => panic!("expected matching property targets"),
        }
    }

    #[test]
    fn child_resolves_to_target_resource() {
        let cache = fixture();
        let target = resolve_target(&cache, "/redfish/v1/Systems", "1").unwrap();
        assert!(matches!(target, Target::Resource { path, .. } if path == "/redfish/v1/Systems/1"));
    }

    #[test]
    fn rejects_absolute_path_off_root() {
        let cache = fixture();
        let err = resolve_target(&cache, "/redfish/v1", "/other/thing").unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }
}
