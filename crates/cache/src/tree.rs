//! Checksum tree built from a marker listing

use crate::layout::CacheLayout;
use groundwork_core::{Checksum, Error, Result, DONE_SUFFIX};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Task name to the checksums already completed on the target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumTree {
    tasks: BTreeMap<String, BTreeSet<Checksum>>,
}

impl ChecksumTree {
    /// Parse the output of [`CacheLayout::listing_query`].
    ///
    /// Each line is `<root>/<task>/<checksum>.done`. A checksum of the wrong
    /// length, or a marker outside any task directory, is a corruption error.
    pub fn from_listing(layout: &CacheLayout, listing: &str) -> Result<Self> {
        let prefix = if layout.root() == "/" {
            "/".to_string()
        } else {
            format!("{}/", layout.root())
        };

        let mut tasks: BTreeMap<String, BTreeSet<Checksum>> = BTreeMap::new();
        for line in listing.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let relative = line
                .strip_prefix(&prefix)
                .ok_or_else(|| Error::cache_tree_corruption("", line))?;

            let (task, file) = relative
                .rsplit_once('/')
                .ok_or_else(|| Error::cache_tree_corruption("", relative))?;
            let value = file.strip_suffix(DONE_SUFFIX).unwrap_or(file);
            let checksum = Checksum::parse(value)
                .ok_or_else(|| Error::cache_tree_corruption(task, value))?;

            tasks.entry(task.to_string()).or_default().insert(checksum);
        }

        debug!(task_count = tasks.len(), "Built checksum tree");
        Ok(Self { tasks })
    }

    pub fn get(&self, task: &str) -> Option<&BTreeSet<Checksum>> {
        self.tasks.get(task)
    }

    pub fn contains_task(&self, task: &str) -> bool {
        self.tasks.contains_key(task)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<Checksum>)> {
        self.tasks.iter().map(|(k, v)| (k.as_str(), v))
    }
}
