//! Memoized dataset loading
//!
//! Parsing and normalizing a file is the only expensive step that does not
//! depend on filter controls, so datasets are cached by the SHA-256 of the
//! file content. The cache is an ordinary value owned by its caller;
//! invalidation is explicit.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::filter::filter_options;
use crate::import::{load_bytes, FileFormat};
use crate::models::FilterOptions;
use crate::normalize::{normalize, NormalizedSet};

/// Hex SHA-256 of file content, used as the dataset id
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// A loaded, normalized dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub id: String,
    pub normalized: NormalizedSet,
    pub options: FilterOptions,
}

impl Dataset {
    /// Parse and normalize raw file content
    pub fn from_bytes(bytes: &[u8], format: FileFormat, config: &AnalysisConfig) -> Result<Self> {
        let table = load_bytes(bytes, format)?;
        let normalized = normalize(&table, config)?;
        let options = filter_options(&normalized.records);
        Ok(Self {
            id: content_hash(bytes),
            normalized,
            options,
        })
    }
}

/// Whether a lookup was served from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// Bounded content-addressed cache; evicts the oldest insertion first
#[derive(Debug)]
pub struct DatasetCache {
    capacity: usize,
    entries: HashMap<String, Arc<Dataset>>,
    insertion_order: VecDeque<String>,
}

impl DatasetCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    /// Return the cached dataset for this content, loading it on a miss.
    ///
    /// Load failures (e.g. a missing required column) are not cached.
    pub fn get_or_load(
        &mut self,
        bytes: &[u8],
        format: FileFormat,
        config: &AnalysisConfig,
    ) -> Result<(Arc<Dataset>, CacheStatus)> {
        let id = content_hash(bytes);
        if let Some(dataset) = self.entries.get(&id) {
            debug!(id = %id, "Dataset cache hit");
            return Ok((Arc::clone(dataset), CacheStatus::Hit));
        }

        let dataset = Dataset::from_bytes(bytes, format, config)?;
        Ok((self.insert(dataset), CacheStatus::Miss))
    }

    /// Store a dataset loaded outside the cache.
    ///
    /// If the same content was inserted meanwhile, the existing entry is
    /// kept and returned.
    pub fn insert(&mut self, dataset: Dataset) -> Arc<Dataset> {
        if let Some(existing) = self.entries.get(&dataset.id) {
            return Arc::clone(existing);
        }

        while self.entries.len() >= self.capacity {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    debug!(id = %oldest, "Evicting dataset");
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        let dataset = Arc::new(dataset);
        self.insertion_order.push_back(dataset.id.clone());
        self.entries.insert(dataset.id.clone(), Arc::clone(&dataset));
        dataset
    }

    pub fn get(&self, id: &str) -> Option<Arc<Dataset>> {
        self.entries.get(id).cloned()
    }

    /// Drop one dataset; returns whether it was cached
    pub fn invalidate(&mut self, id: &str) -> bool {
        self.insertion_order.retain(|i| i != id);
        let removed = self.entries.remove(id).is_some();
        if removed {
            info!(id = %id, "Dataset invalidated");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
