//! Last synchronized version of every tracked file
//!
//! Prevents refetching versions that are already materialized in Git, and
//! keeps the read path from importing check-ins the write path just made.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::branch::BranchFilter;
use crate::error::Result;
use crate::workspace::normalize;

/// Version assumed for files the cache has never seen
const EMPTY_VERSION: &str = "/main/0";

/// Separator between element path and version (`file@@/main/3`)
pub const VERSION_SEPARATOR: &str = "@@";

/// Read/update/write contract of the synchronization cache
pub trait SyncCache {
    /// Record `version` for `file`
    ///
    /// Returns true when the version is new for the file and worth fetching.
    fn update(&mut self, file: &str, version: &str) -> bool;

    /// Forget `file`
    fn remove(&mut self, file: &str);

    /// Persist all pending updates
    fn write(&mut self) -> Result<()>;
}

/// [`SyncCache`] stored as sorted `file@@version` lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    /// Versions on its first branch are accepted over any cached branch version
    mainline: Option<BranchFilter>,
}

impl FileCache {
    /// An empty cache that will be written to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
            mainline: None,
        }
    }

    /// Accept versions on the first branch of `filter` whatever was cached before
    pub fn with_mainline(mut self, filter: BranchFilter) -> Self {
        self.mainline = Some(filter);
        self
    }

    /// Load the cache at `path`, or `None` when it has never been written
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let mut cache = Self::new(path);
        cache.seed(&fs::read_to_string(path)?);
        Ok(Some(cache))
    }

    /// Merge `file@@version` lines (cache file or `cleartool ls -short` output)
    pub fn seed(&mut self, listing: &str) {
        for line in listing.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((file, version)) = line.split_once(VERSION_SEPARATOR) {
                self.update(file, version);
            }
        }
    }

    pub fn version(&self, file: &str) -> Option<&str> {
        self.entries.get(&normalize(file)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SyncCache for FileCache {
    fn update(&mut self, file: &str, version: &str) -> bool {
        let file = normalize(file);
        let version = version.trim().replace('\\', "/");
        let current = self
            .entries
            .get(&file)
            .map(String::as_str)
            .unwrap_or(EMPTY_VERSION);

        let merged_back = self
            .mainline
            .as_ref()
            .is_some_and(|filter| filter.on_mainline(&version));
        let changed = current != version && (is_descendant(current, &version) || merged_back);
        if changed {
            self.entries.insert(file, version);
        }
        changed
    }

    fn remove(&mut self, file: &str) {
        self.entries.remove(&normalize(file));
    }

    fn write(&mut self) -> Result<()> {
        let mut text = String::new();
        for (file, version) in &self.entries {
            text.push_str(file);
            text.push_str(VERSION_SEPARATOR);
            text.push_str(version);
            text.push('\n');
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text)?;
        debug!(entries = self.entries.len(), "wrote {}", self.path.display());
        Ok(())
    }
}

/// Is `candidate` on the branch of `current` or on a branch below it?
///
/// Versions on sibling branches never replace each other.
fn is_descendant(current: &str, candidate: &str) -> bool {
    let branch = |v: &str| v.rsplit_once('/').map(|(b, _)| b.to_string()).unwrap_or_default();
    let current_branch = branch(current);
    let candidate_branch = branch(candidate);
    candidate_branch == current_branch || candidate_branch.starts_with(&format!("{}/", current_branch))
}
