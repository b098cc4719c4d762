//! Public filesystem API: thin operations over cache + resolver.

use crate::cache::Cache;
use crate::error::Result;
use crate::model::{Entry, EntryKind, Property, Target};
use crate::path;
use crate::resolver;
use crate::transport::FetchClient;

/// The virtual filesystem engine: a cache plus the resolver operations
/// layered over it. Cheaply shared (internally `Arc`/`RwLock`-backed via
/// `Cache`), `Send + Sync` whenever its `FetchClient` is.
pub struct Fs<C: FetchClient> {
    cache: Cache<C>,
}

impl<C: FetchClient> Fs<C> {
    pub fn new(client: C) -> Self {
        Self { cache: Cache::new(client) }
    }

    pub fn cache(&self) -> &Cache<C> {
        &self.cache
    }

    /// Fetch (or return cached) the resource at `path`.
    pub fn get(&self, path: &str) -> Result<crate::model::Resource> {
        self.cache.get(path).map(|arc| (*arc).clone())
    }

    /// Uncached write: POST `body` to `path`, returning the raw response
    /// and status code without parsing or caching it.
    pub fn post(&self, path: &str, body: serde_json::Value) -> Result<(Vec<u8>, u16)> {
        self.cache.post(path, body)
    }

    pub fn resolve_target(&self, base: &str, target: &str) -> Result<Target> {
        resolver::resolve_target(&self.cache, base, target)
    }

    /// One Entry per Child and one per Property of the resource at
    /// `resource_path`, sorted by name.
    pub fn list_all(&self, resource_path: &str) -> Result<Vec<Entry>> {
        let resource = self.cache.get(resource_path)?;
        let mut entries = Vec::with_capacity(resource.children.len() + resource.properties.len());
        for child in resource.children.values() {
            let kind = match child.kind {
                crate::model::ChildKind::Link => EntryKind::Link,
                crate::model::ChildKind::Symlink => EntryKind::Symlink,
            };
            entries.push(Entry {
                name: child.name.clone(),
                path: child.target.clone(),
                size: 0,
                modified: None,
                kind,
            });
        }
        for prop in resource.properties.values() {
            entries.push(property_entry(resource_path, prop, Some(resource.fetched_at)));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Properties only, sorted by name.
    pub fn list_properties(&self, resource_path: &str) -> Result<Vec<Property>> {
        let resource = self.cache.get(resource_path)?;
        let mut props: Vec<Property> = resource.properties.values().cloned().collect();
        props.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(props)
    }

    pub fn parent(&self, p: &str) -> String {
        path::parent(p)
    }

    pub fn join(&self, base: &str, target: &str) -> String {
        path::join(base, target)
    }
}

fn property_entry(resource_path: &str, prop: &Property, modified: Option<crate::timestamp::Timestamp>) -> Entry {
    let kind = match &prop.kind {
        crate::model::PropertyKind::Simple(_) => EntryKind::Property,
        crate::model::PropertyKind::Object(_) => EntryKind::Complex,
        crate::model::PropertyKind::Array(_) => EntryKind::Array,
        crate::model::PropertyKind::Link(_) => EntryKind::Link,
    };
    Entry {
        name: prop.name.clone(),
        path: path::join(resource_path, &prop.name),
        size: prop.byte_len(),
        modified,
        kind,
    }
}
