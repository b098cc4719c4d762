//! Crawl ("scrape"): fetch every resource reachable from a root path whose
//! transitive children are not already cached.
//!
//! Startup computes a BFS frontier using only the current cache contents
//! (no network); each step pops one frontier path, fetches it, and
//! discovers new frontier entries from its children.

use crate::error::Result;
use crate::fs::Fs;
use crate::ops::Progress;
use crate::transport::FetchClient;
use std::collections::{HashSet, VecDeque};

pub struct CrawlOp<'a, C: FetchClient> {
    fs: &'a Fs<C>,
    queue: VecDeque<String>,
    visited: HashSet<String>,
    progress: Progress,
}

impl<'a, C: FetchClient> CrawlOp<'a, C> {
    /// Compute the initial frontier: cache-only BFS from `root`. A cached
    /// path contributes its children to the BFS; an uncached path becomes
    /// a frontier entry to fetch during `step`.
    pub fn start(fs: &'a Fs<C>, root: &str) -> Result<Self> {
        let known: HashSet<String> = fs.cache().known_paths()?.into_iter().collect();
        let mut bfs_queue = VecDeque::from([root.to_string()]);
        let mut bfs_visited = HashSet::new();
        let mut frontier = VecDeque::new();

        while let Some(path) = bfs_queue.pop_front() {
            if !bfs_visited.insert(path.clone()) {
                continue;
            }
            if known.contains(&path) {
                if let Some(resource) = fs.cache().peek(&path)? {
                    for child in resource.children.values() {
                        bfs_queue.push_back(child.target.clone());
                    }
                }
            } else {
                frontier.push_back(path);
            }
        }

        let total = frontier.len();
        Ok(Self { fs, queue: frontier, visited: bfs_visited, progress: Progress { total, ..Progress::started() } })
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

    /// Run one step: fetch the next frontier path, discover its children.
    /// Returns the path that was processed, or `None` if the operation is
    /// already finished.
    pub fn step(&mut self) -> Option<String> {
        if self.is_done() {
            return None;
        }
        let path = self.queue.pop_front()?;
        match self.fs.cache().get(&path) {
            Ok(resource) => {
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

    /// Drive the operation to completion, one step at a time, ignoring
    /// cancellation (for callers that want a blocking "run it all now").
    pub fn run_to_completion(&mut self) -> &Progress {
        while self.step().is_some() {}
        &self.progress
    }
}
