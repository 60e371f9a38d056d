//! System reference directories keyed by API level.
//!
//! `<framework_root>/<api_level>` and its immediate sub-directories hold the
//! framework assemblies a unit compiles against. Scanning them is the same
//! for every unit of a level, so the result is cached per level behind a
//! read/write lock. Entries are filled on first request and only dropped by
//! [`ReferenceDirectoryCache::invalidate`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Lazily-populated, thread-safe read-through cache.
#[derive(Debug, Default)]
pub struct ReferenceDirectoryCache {
    framework_root: Option<PathBuf>,
    entries: RwLock<HashMap<String, Arc<[PathBuf]>>>,
}

impl ReferenceDirectoryCache {
    pub fn new(framework_root: Option<PathBuf>) -> Self {
        ReferenceDirectoryCache {
            framework_root,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Directories for `api_level`, scanning the filesystem on first use.
    ///
    /// Without a framework root, or when the level directory does not exist,
    /// the list is empty.
    pub fn directories(&self, api_level: &str) -> Arc<[PathBuf]> {
        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(api_level)
        {
            return Arc::clone(hit);
        }

        let scanned: Arc<[PathBuf]> = match &self.framework_root {
            Some(root) => scan_level(&root.join(api_level)).into(),
            None => Arc::from(Vec::new()),
        };

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another task may have filled the entry while we scanned.
        Arc::clone(
            entries
                .entry(api_level.to_string())
                .or_insert(scanned),
        )
    }

    /// Drop every cached level.
    pub fn invalidate(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn cached_levels(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn scan_level(level_dir: &Path) -> Vec<PathBuf> {
    if !level_dir.is_dir() {
        tracing::debug!("no reference directory at {}", level_dir.display());
        return Vec::new();
    }
    let mut subdirs: Vec<PathBuf> = match std::fs::read_dir(level_dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.path())
            .collect(),
        Err(err) => {
            tracing::warn!("cannot list {}: {}", level_dir.display(), err);
            Vec::new()
        }
    };
    subdirs.sort();

    let mut dirs = Vec::with_capacity(subdirs.len() + 1);
    dirs.push(level_dir.to_path_buf());
    dirs.extend(subdirs);
    dirs
}
