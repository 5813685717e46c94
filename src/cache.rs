//! Cache artifacts for derived tables.
//!
//! Each transformation stage persists its result under a fixed key so a later
//! call can skip recomputation. [`FsCache`] keeps one CSV file per key in the
//! data directory; [`MemoryCache`] keeps the same CSV bytes in memory for
//! tests and short-lived sessions.

use crate::error::{PipelineError, Result};
use crate::processor::{read_csv_bytes, write_csv_bytes};

use polars::prelude::DataFrame;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Storage for cache artifacts keyed by file name.
///
/// An artifact is either replaced whole by `store` or left untouched;
/// there is no update in place.
pub trait CacheStore {
    /// Load the artifact stored under `key`, if any
    fn load(&self, key: &str) -> Result<Option<DataFrame>>;

    /// Persist `df` under `key`, replacing any previous artifact
    fn store(&self, key: &str, df: &mut DataFrame) -> Result<()>;

    /// Delete the artifact under `key`; returns whether one existed
    fn invalidate(&self, key: &str) -> Result<bool>;

    /// Whether an artifact exists under `key`
    fn contains(&self, key: &str) -> bool;
}

/// One CSV file per key inside a directory
#[derive(Debug, Clone)]
pub struct FsCache {
    dir: PathBuf,
}

impl FsCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact stored under `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl CacheStore for FsCache {
    fn load(&self, key: &str) -> Result<Option<DataFrame>> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        debug!("Loading cached artifact {}", path.display());
        read_csv_bytes(bytes).map(Some)
    }

    fn store(&self, key: &str, df: &mut DataFrame) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let bytes = write_csv_bytes(df)?;
        let path = self.path_for(key);
        let staging = self.dir.join(format!(".{key}.tmp"));

        fs::write(&staging, bytes)?;
        fs::rename(&staging, &path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            PipelineError::cache(key, format!("failed to replace {}: {}", path.display(), e))
        })?;

        debug!("Stored {} rows at {}", df.height(), path.display());
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<bool> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }
}

/// In-memory stand-in for [`FsCache`] with the same CSV round trip
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Stored keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl CacheStore for MemoryCache {
    fn load(&self, key: &str) -> Result<Option<DataFrame>> {
        let bytes = self.entries.borrow().get(key).cloned();
        bytes.map(read_csv_bytes).transpose()
    }

    fn store(&self, key: &str, df: &mut DataFrame) -> Result<()> {
        let bytes = write_csv_bytes(df)?;
        self.entries.borrow_mut().insert(key.to_string(), bytes);
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<bool> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}
