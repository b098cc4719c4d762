//! Core data model: Resource, Property, Child, Entry, Target.
//!
//! References:
//! - DMTF Redfish Specification DSP0266 — `https://www.dmtf.org/standards/redfish`
//! - OASIS OData 4.01 Part 1: Protocol — `https://docs.oasis-open.org/odata/`

use crate::timestamp::Timestamp;
use std::collections::BTreeMap;

/// Whether a Child's target lies within its parent's subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    /// Target is at or under the parent's path prefix.
    Link,
    /// Target lies outside the parent subtree.
    Symlink,
}

/// A reference from one resource to another, extracted by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub name: String,
    pub target: String,
    pub parent: String,
    pub kind: ChildKind,
}

impl Child {
    pub fn new(name: impl Into<String>, target: impl Into<String>, parent: impl Into<String>) -> Self {
        let parent = parent.into();
        let target = target.into();
        let kind = if crate::path::is_under(&parent, &target) { ChildKind::Link } else { ChildKind::Symlink };
        Self { name: name.into(), target, parent, kind }
    }
}

/// A property's recursive sum-type variant.
///
/// A Property variant determines which auxiliary fields are meaningful:
/// a Simple carries a scalar, an Object/Array carries children, a Link
/// carries a target path. Illegal combinations are unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    Simple(serde_json::Value),
    Object(BTreeMap<String, Property>),
    Array(Vec<Property>),
    Link(String),
}

/// A single field within a resource or a nested property subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub raw: serde_json::Value,
    pub kind: PropertyKind,
}

impl Property {
    pub fn simple(name: impl Into<String>, raw: serde_json::Value, value: serde_json::Value) -> Self {
        Self { name: name.into(), raw, kind: PropertyKind::Simple(value) }
    }

    pub fn object(name: impl Into<String>, raw: serde_json::Value, children: BTreeMap<String, Property>) -> Self {
        Self { name: name.into(), raw, kind: PropertyKind::Object(children) }
    }

    pub fn array(name: impl Into<String>, raw: serde_json::Value, elements: Vec<Property>) -> Self {
        Self { name: name.into(), raw, kind: PropertyKind::Array(elements) }
    }

    pub fn link(name: impl Into<String>, raw: serde_json::Value, target: impl Into<String>) -> Self {
        Self { name: name.into(), raw, kind: PropertyKind::Link(target.into()) }
    }

    /// Children of this property, if it is an Object or an Array (by
    /// synthesized `[i]` name); `None` for Simple and Link.
    pub fn children(&self) -> Option<BTreeMap<String, &Property>> {
        match &self.kind {
            PropertyKind::Object(map) => Some(map.iter().map(|(k, v)| (k.clone(), v)).collect()),
            PropertyKind::Array(elements) => {
                Some(elements.iter().enumerate().map(|(i, p)| (format!("[{i}]"), p)).collect())
            }
            PropertyKind::Simple(_) | PropertyKind::Link(_) => None,
        }
    }

    /// Raw JSON byte length, for Entry::size.
    pub fn byte_len(&self) -> usize {
        self.raw.to_string().len()
    }
}

/// An independently addressable document, identified by its own URL.
#[derive(Debug, Clone)]
pub struct Resource {
    pub path: String,
    pub odata_type: Option<String>,
    pub raw_bytes: Vec<u8>,
    pub properties: BTreeMap<String, Property>,
    pub children: BTreeMap<String, Child>,
    pub fetched_at: Timestamp,
}

impl Resource {
    /// Canonical path, as declared by the document's own `@odata.id`.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Kind tag for a uniform listing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Resource,
    Property,
    Complex,
    Array,
    Link,
    Symlink,
}

impl EntryKind {
    /// Whether this kind behaves like a directory for navigation purposes.
    pub fn is_directory(self) -> bool {
        matches!(
            self,
            EntryKind::Resource | EntryKind::Link | EntryKind::Symlink | EntryKind::Complex | EntryKind::Array
        )
    }
}

/// A uniform listing item: one Child or Property, displayed identically.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub path: String,
    pub size: usize,
    pub modified: Option<Timestamp>,
    pub kind: EntryKind,
}

/// The typed outcome of path resolution.
#[derive(Debug, Clone)]
pub enum Target {
    /// Resolved to a standalone resource at the given canonical path.
    Resource { resource: Resource, path: String },
    /// Resolved to a property nested inside a resource.
    Property { resource: Resource, property: Property, resource_path: String },
    /// Resolved to a Property-kind-Link that can be followed.
    Link { property: Property, resource_path: String },
}
