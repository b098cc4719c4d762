//! Recursive search ("find"): properties whose names match a
//! case-insensitive regular expression, anywhere in the subtree rooted at
//! the current base.
//!
//! If the base is already a property subtree, the search runs entirely
//! in memory (no fetches). If the base is a resource, a breadth-first
//! search fetches resources up to [`super::SEARCH_DEPTH_CAP`] child hops
//! deep, formatting hits as `"<prefix>/<prop path> = <value>"`.

use crate::error::Result;
use crate::fs::Fs;
use crate::model::{Property, PropertyKind, Target};
use crate::ops::{Progress, SEARCH_DEPTH_CAP};
use crate::transport::FetchClient;
use regex::Regex;
use std::collections::{BTreeMap, VecDeque};

struct QueueEntry {
    path: String,
    prefix: String,
    depth: usize,
}

pub struct SearchOp<'a, C: FetchClient> {
    fs: &'a Fs<C>,
    regex: Regex,
    queue: VecDeque<QueueEntry>,
    hits: Vec<String>,
    progress: Progress,
}

impl<'a, C: FetchClient> SearchOp<'a, C> {
    /// Build a case-insensitive matcher and prime the search. Returns an
    /// error if `pattern` is not a valid regular expression or if `base`
    /// cannot be resolved.
    pub fn start(fs: &'a Fs<C>, base: &str, pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("(?i){pattern}"))
            .map_err(|e| crate::error::Error::InvalidPath(format!("bad search pattern: {e}")))?;
        let mut op = Self { fs, regex, queue: VecDeque::new(), hits: Vec::new(), progress: Progress::started() };

        match fs.resolve_target(base, "")? {
            Target::Property { property, resource_path, .. } => {
                op.walk_property(&resource_path, "", &property);
                op.progress.done = 1;
                op.progress.total = 1;
            }
            Target::Resource { path, .. } => {
                op.queue.push_back(QueueEntry { path, prefix: String::new(), depth: 0 });
                op.progress.total = 1;
            }
            Target::Link { resource_path, .. } => {
                op.queue.push_back(QueueEntry { path: resource_path, prefix: String::new(), depth: 0 });
                op.progress.total = 1;
            }
        }
        Ok(op)
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn hits(&self) -> &[String] {
        &self.hits
    }

    pub fn cancel(&mut self) {
        self.progress.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.queue.is_empty() || self.progress.cancelled
    }

    pub fn step(&mut self) -> Option<String> {
        if self.is_done() {
            return None;
        }
        let entry = self.queue.pop_front()?;
        match self.fs.cache().get(&entry.path) {
            Ok(resource) => {
                let display_prefix = if entry.prefix.is_empty() { resource.path.clone() } else { entry.prefix.clone() };
                for prop in resource.properties.values() {
                    self.walk_property(&display_prefix, "", prop);
                }
                if entry.depth < SEARCH_DEPTH_CAP {
                    for child in resource.children.values() {
                        let child_prefix = format!("{display_prefix}/{}", child.name);
                        self.queue.push_back(QueueEntry {
                            path: child.target.clone(),
                            prefix: child_prefix,
                            depth: entry.depth + 1,
                        });
                        self.progress.total += 1;
                    }
                }
            }
            Err(err) => self.progress.errors.push(format!("{}: {err}", entry.path)),
        }
        self.progress.done += 1;
        Some(entry.path)
    }

    pub fn run_to_completion(&mut self) -> &Progress {
        while self.step().is_some() {}
        &self.progress
    }

    fn walk_property(&mut self, prefix: &str, rel_path: &str, prop: &Property) {
        let prop_path = if rel_path.is_empty() { prop.name.clone() } else { format!("{rel_path}/{}", prop.name) };
        if self.regex.is_match(&prop.name) {
            self.hits.push(format!("{prefix}/{prop_path} = {}", format_value(prop)));
        }
        if let Some(children) = prop.children() {
            let mut sorted: BTreeMap<String, &Property> = BTreeMap::new();
            for (k, v) in children {
                sorted.insert(k, v);
            }
            for child in sorted.values() {
                self.walk_property(prefix, &prop_path, child);
            }
        }
    }
}

fn format_value(prop: &Property) -> String {
    match &prop.kind {
        PropertyKind::Simple(v) => v.to_string(),
        PropertyKind::Object(_) => "{...}".to_string(),
        PropertyKind::Array(_) => "[...]".to_string(),
        PropertyKind::Link(target) => format!("-> {target}"),
    }
}
