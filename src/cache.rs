//! Process-local cache of loaded datasets.
//!
//! A cached entry is reused only while the file on disk still has the same
//! length and modification time and the caller asks for the same load
//! options. Anything else reloads.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::DashboardError;
use crate::model::{Dataset, LoadOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self, DashboardError> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

#[derive(Debug)]
struct CachedDataset {
    fingerprint: Fingerprint,
    options: LoadOptions,
    dataset: Arc<Dataset>,
}

#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, CachedDataset>,
    loads: usize,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the dataset for `path`, parsing the file only on a miss.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        options: &LoadOptions,
    ) -> Result<Arc<Dataset>, DashboardError> {
        let key = fs::canonicalize(path)?;
        let fingerprint = Fingerprint::of(&key)?;

        if let Some(entry) = self.entries.get(&key) {
            if entry.fingerprint == fingerprint && entry.options == *options {
                tracing::debug!(path = %key.display(), "dataset cache hit");
                return Ok(Arc::clone(&entry.dataset));
            }
        }

        tracing::debug!(path = %key.display(), "dataset cache miss");
        let dataset = Arc::new(Dataset::load_csv(&key, options)?);
        self.loads += 1;
        self.entries.insert(
            key,
            CachedDataset {
                fingerprint,
                options: options.clone(),
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// Number of times a file was actually parsed.
    pub fn loads(&self) -> usize {
        self.loads
    }

    pub fn invalidate(&mut self, path: &Path) {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.entries.remove(&key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
