//! In-memory fingerprint index.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tonearm_core::audio::{AudioId, AudioInfo};
use tonearm_core::index::{FingerprintIndex, QueryMatch};
use tonearm_core::{Error, Result};

/// Score for a query naming the registered path exactly.
const EXACT_SCORE: u32 = 100;

/// Score for a query sharing only the registered file name.
const FILE_NAME_SCORE: u32 = 50;

/// Configuration for the in-memory index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct MemoryIndexConfig {
    /// Reject registrations that carry no local file
    #[cfg_attr(feature = "config", arg(long = "mock-index-require-path"))]
    #[serde(default)]
    pub require_path: bool,
}

/// One registration as seen by the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub id: AudioId,
    pub path: Option<PathBuf>,
    pub info: AudioInfo,
}

/// Fingerprint index that "fingerprints" by path.
///
/// A query matches an entry when it names the registered path exactly, or
/// when only the file names agree. Re-registering an identifier replaces
/// the previous entry.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    config: MemoryIndexConfig,
    entries: Mutex<Vec<StoredEntry>>,
}

impl MemoryIndex {
    /// Creates a new in-memory index with the given configuration.
    pub fn new(config: MemoryIndexConfig) -> Self {
        Self {
            config,
            entries: Mutex::default(),
        }
    }

    /// Every accepted registration, in insertion order.
    pub fn entries(&self) -> Vec<StoredEntry> {
        self.lock().clone()
    }

    /// The registration stored under `id`, if any.
    pub fn entry(&self, id: AudioId) -> Option<StoredEntry> {
        self.lock().iter().find(|e| e.id == id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn score(registered: &Path, query: &Path) -> Option<u32> {
        if registered == query {
            return Some(EXACT_SCORE);
        }

        match (registered.file_name(), query.file_name()) {
            (Some(a), Some(b)) if a == b => Some(FILE_NAME_SCORE),
            _ => None,
        }
    }
}

impl FingerprintIndex for MemoryIndex {
    fn store(&self, id: AudioId, path: Option<&Path>, info: &AudioInfo) -> Result<bool> {
        if path.is_none() && self.config.require_path {
            return Ok(false);
        }

        let entry = StoredEntry {
            id,
            path: path.map(Path::to_path_buf),
            info: info.clone(),
        };

        let mut entries = self.lock();
        match entries.iter_mut().find(|e| e.id == id) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }

        Ok(true)
    }

    fn query(&self, path: &Path) -> Result<QueryMatch> {
        self.query_list(path)?.into_iter().next().ok_or_else(|| {
            Error::not_found().with_message(format!("no match for '{}'", path.display()))
        })
    }

    fn query_list(&self, path: &Path) -> Result<Vec<QueryMatch>> {
        let mut matches: Vec<QueryMatch> = self
            .lock()
            .iter()
            .filter_map(|entry| {
                let registered = entry.path.as_deref()?;
                let score = Self::score(registered, path)?;
                Some(QueryMatch::new(entry.id, score))
            })
            .collect();

        matches.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(matches)
    }

    fn describe(&self, id: AudioId) -> Result<AudioInfo> {
        self.entry(id)
            .map(|entry| entry.info)
            .ok_or_else(|| Error::not_found().with_message(format!("no asset with id {id}")))
    }
}
