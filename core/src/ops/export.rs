//! Export: produce a single JSON document mapping canonical path → raw
//! bytes for every resource reachable from the current base.
//!
//! Discovery and fetch follow the same cache-only-BFS-then-fetch pattern
//! as crawl, but additionally capture the raw JSON of every resource
//! encountered — both already-cached ones (captured at startup) and
//! newly fetched ones (captured per step). On cancellation, no partial
//! file is written; the caller simply does not call `finish`.

use crate::error::Result;
use crate::fs::Fs;
use crate::ops::Progress;
use crate::transport::FetchClient;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::Path;

pub struct ExportOp<'a, C: FetchClient> {
    fs: &'a Fs<C>,
    queue: VecDeque<String>,
    visited: HashSet<String>,
    collected: BTreeMap<String, serde_json::Value>,
    progress: Progress,
}

impl<'a, C: FetchClient> ExportOp<'a, C> {
    pub fn start(fs: &'a Fs<C>, root: &str) -> Result<Self> {
        let known: HashSet<String> = fs.cache().known_paths()?.into_iter().collect();
        let mut bfs_queue = VecDeque::from([root.to_string()]);
        let mut bfs_visited = HashSet::new();
        let mut frontier = VecDeque::new();
        let mut collected = BTreeMap::new();

        while let Some(path) = bfs_queue.pop_front() {
            if !bfs_visited.insert(path.clone()) {
                continue;
            }
            if known.contains(&path) {
                if let Some(resource) = fs.cache().peek(&path)? {
                    if let Ok(value) = serde_json::from_slice(&resource.raw_bytes) {
                        collected.insert(path.clone(), value);
                    }
                    for child in resource.children.values() {
                        bfs_queue.push_back(child.target.clone());
                    }
                }
            } else {
                frontier.push_back(path);
            }
        }

        let total = frontier.len();
        Ok(Self {
            fs,
            queue: frontier,
            visited: bfs_visited,
            collected,
            progress: Progress { total, ..Progress::started() },
        })
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
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
        let path = self.queue.pop_front()?;
        match self.fs.cache().get(&path) {
            Ok(resource) => {
                if let Ok(value) = serde_json::from_slice(&resource.raw_bytes) {
                    self.collected.insert(path.clone(), value);
                }
                for child in resource.children.values() {
                    if self.visited.insert(child.target.clone()) {
                        self.queue.push_back(child.target.clone());
                        self.progress.total += 1;
                    }
                }
            }
            Err(err) => self.progress.errors.push(format!("{path}: {err}")),
        }
        self.progress.done += 1;
        Some(path)
    }

    pub fn run_to_completion(&mut self) -> &Progress {
        while self.step().is_some() {}
        &self.progress
    }

    /// Serialize the collected map as 2-space-indented JSON to `file`.
    /// Refuses to write if the operation was cancelled before completing.
    pub fn finish(&self, file: impl AsRef<Path>) -> Result<()> {
        if self.progress.cancelled {
            return Err(crate::error::Error::InvalidPath("export cancelled, no partial file written".to_string()));
        }
        let json = serde_json::to_vec_pretty(&self.collected)?;
        std::fs::write(file, json)?;
        Ok(())
    }
}
