//! Resource cache: single source of truth for parsed resources.
//!
//! Fetch-on-miss, straightforward store. Unlike a bounded LRU/CAR cache,
//! nothing is ever evicted except by explicit `invalidate`/`clear` — the
//! cache is unbounded per session. All store mutations go through an
//! `RwLock` so the cache can be shared across consumers without undefined
//! behavior, even though this crate itself drives fetches single-threaded.

use crate::error::{Error, Result};
use crate::model::Resource;
use crate::parser;
use crate::timestamp::Timestamp;
use crate::transport::FetchClient;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// On-disk record for a single cached resource (§6 cache file schema).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheRecord {
    path: String,
    #[serde(rename = "odataId")]
    odata_id: String,
    #[serde(rename = "odataType")]
    odata_type: Option<String>,
    #[serde(rename = "fetchedAt")]
    fetched_at: Timestamp,
    data: String,
}

struct Store {
    resources: BTreeMap<String, Arc<Resource>>,
    offline: bool,
}

/// The resource cache. Cheaply clonable; all clones share the same store.
pub struct Cache<C: FetchClient> {
    client: C,
    store: RwLock<Store>,
}

impl<C: FetchClient> Cache<C> {
    pub fn new(client: C) -> Self {
        Self { client, store: RwLock::new(Store { resources: BTreeMap::new(), offline: false }) }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Store>> {
        self.store.read().map_err(|e| Error::Lock(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Store>> {
        self.store.write().map_err(|e| Error::Lock(e.to_string()))
    }

    /// Return the cached resource at `path`, fetching and parsing on miss.
    pub fn get(&self, path: &str) -> Result<Arc<Resource>> {
        if let Some(r) = self.read()?.resources.get(path) {
            return Ok(Arc::clone(r));
        }
        if self.read()?.offline {
            return Err(Error::NotCached(path.to_string()));
        }
        log::debug!("cache miss, fetching {path}");
        let bytes = self.client.fetch(path)?;
        let resource = parser::parse(path, &bytes, Timestamp::now())?;
        let canonical = resource.path.clone();
        let arc = Arc::new(resource);
        self.write()?.resources.insert(canonical, Arc::clone(&arc));
        Ok(arc)
    }

    /// Issue an uncached POST straight through to the fetch client.
    pub fn post(&self, path: &str, body: serde_json::Value) -> Result<(Vec<u8>, u16)> {
        self.client.post(path, body)
    }

    /// Look up a cached resource without fetching on miss.
    pub fn peek(&self, path: &str) -> Result<Option<Arc<Resource>>> {
        Ok(self.read()?.resources.get(path).cloned())
    }

    pub fn invalidate(&self, path: &str) -> Result<()> {
        self.write()?.resources.remove(path);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.write()?.resources.clear();
        Ok(())
    }

    pub fn known_paths(&self) -> Result<Vec<String>> {
        Ok(self.read()?.resources.keys().cloned().collect())
    }

    pub fn set_offline(&self, flag: bool) -> Result<()> {
        self.write()?.offline = flag;
        Ok(())
    }

    pub fn is_offline(&self) -> Result<bool> {
        Ok(self.read()?.offline)
    }

    /// Persist all cached resources to a single JSON file.
    pub fn save(&self, file: impl AsRef<Path>) -> Result<()> {
        let store = self.read()?;
        let mut out: BTreeMap<String, CacheRecord> = BTreeMap::new();
        for (path, resource) in store.resources.iter() {
            out.insert(
                path.clone(),
                CacheRecord {
                    path: resource.path.clone(),
                    odata_id: resource.path.clone(),
                    odata_type: resource.odata_type.clone(),
                    fetched_at: resource.fetched_at,
                    data: BASE64.encode(&resource.raw_bytes),
                },
            );
        }
        let json = serde_json::to_vec_pretty(&out)?;
        std::fs::write(file, json)?;
        Ok(())
    }

    /// Default cache filename for an endpoint, derived from its host:
    /// `.cache_<host>.json`, placed in the working directory. Consumers
    /// that want a different location can pass any path to `save`/`load`
    /// directly.
    pub fn default_file_name(endpoint: &str) -> String {
        let host = url::Url::parse(endpoint)
            .ok()
            .and_then(|u| u.host_str().map(ToString::to_string))
            .unwrap_or_else(|| endpoint.to_string());
        format!(".cache_{host}.json")
    }

    /// Restore cached resources from a single JSON file. A missing file is
    /// not an error; the cache is simply left empty.
    pub fn load(&self, file: impl AsRef<Path>) -> Result<()> {
        let file = file.as_ref();
        if !file.exists() {
            return Ok(());
        }
        let bytes = std::fs::read(file)?;
        let records: BTreeMap<String, CacheRecord> = serde_json::from_slice(&bytes)?;
        let mut store = self.write()?;
        for (path, record) in records {
            let data = BASE64
                .decode(record.data.as_bytes())
                .map_err(|e| Error::InvalidPath(format!("bad base64 in cache record {path}: {e}")))?;
            let resource = parser::parse(&record.path, &data, record.fetched_at)?;
            store.resources.insert(path, Arc::new(resource));
        }
        Ok(())
    }
}
