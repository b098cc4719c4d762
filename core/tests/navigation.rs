//! Black-box navigation tests against the public crate surface, using
//! the mock transport rather than the in-module fixture clients.

use redfish_vfs_core::{Fs, Target};
use redfish_vfs_mock::{Expect, MockTransport};
use serde_json::json;

fn transport() -> MockTransport {
    MockTransport::new([
        Expect::fetch(
            "/redfish/v1",
            json!({
                "@odata.id": "/redfish/v1",
                "Systems": {"@odata.id": "/redfish/v1/Systems"},
            })
            .to_string(),
        ),
        Expect::fetch(
            "/redfish/v1/Systems",
            json!({
                "@odata.id": "/redfish/v1/Systems",
                "Members": [{"@odata.id": "/redfish/v1/Systems/1"}],
            })
            .to_string(),
        ),
        Expect::fetch(
            "/redfish/v1/Systems/1",
            json!({
                "@odata.id": "/redfish/v1/Systems/1",
                "Status": {"State": "Enabled", "Health": "OK"},
                "Links": {"Chassis": [{"@odata.id": "/redfish/v1/Chassis/1"}]},
            })
            .to_string(),
        ),
    ])
}

#[test]
fn walks_from_root_through_collection_into_nested_property() {
    let fs = Fs::new(transport());
    let target = fs.resolve_target("/redfish/v1", "Systems/1/Status/Health").unwrap();
    match target {
        Target::Property { property, .. } => assert_eq!(property.raw, json!("OK")),
        other => panic!("expected property target, got {other:?}"),
    }
}

#[test]
fn list_all_surfaces_both_children_and_properties() {
    let fs = Fs::new(transport());
    fs.get("/redfish/v1").unwrap();
    fs.get("/redfish/v1/Systems").unwrap();
    let entries = fs.list_all("/redfish/v1/Systems").unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["1"]);
}

#[test]
fn follows_a_link_nested_under_an_array_index() {
    let fs = Fs::new(transport());
    let target = fs.resolve_target("/redfish/v1", "Systems/1/Links/Chassis[0]").unwrap();
    match target {
        Target::Link { resource_path, .. } => assert_eq!(resource_path, "/redfish/v1/Chassis/1"),
        other => panic!("expected link target, got {other:?}"),
    }
}

#[test]
fn parent_and_join_round_trip_through_the_public_api() {
    let fs = Fs::new(transport());
    let child = fs.join("/redfish/v1/Systems", "1");
    assert_eq!(child, "/redfish/v1/Systems/1");
    assert_eq!(fs.parent(&child), "/redfish/v1/Systems");
}
