//! File cache for the normalized book dataset.
//!
//! The artifact is one pretty-printed JSON array of records, so a fetched
//! dataset survives process restarts and stays human-diffable. Validity is
//! judged from the file's mtime, counted in whole days against a configured
//! expiry.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::debug;

use crate::book::BookRecord;
use crate::error::{Error, Result};

const SECS_PER_DAY: u64 = 86_400;

/// Age-checked JSON snapshot of the dataset at a fixed path.
pub struct BookCache {
    path: PathBuf,
    expiry_days: u64,
}

impl BookCache {
    pub fn new(path: impl Into<PathBuf>, expiry_days: u64) -> Self {
        Self {
            path: path.into(),
            expiry_days,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True iff the artifact exists and its whole-day age is strictly below
    /// the expiry. An artifact exactly `expiry_days` old is already stale.
    pub fn is_valid(&self) -> bool {
        match self.age_days() {
            Some(age) => age < self.expiry_days,
            None => false,
        }
    }

    fn age_days(&self) -> Option<u64> {
        let modified = fs::metadata(&self.path).ok()?.modified().ok()?;
        // A modification time in the future (clock skew) counts as age zero.
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default();
        Some(age.as_secs() / SECS_PER_DAY)
    }

    /// Read the artifact back into a record table.
    pub fn load(&self) -> Result<Vec<BookRecord>> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| Error::CacheCorrupt(format!("{}: {}", self.path.display(), e)))?;

        let records: Vec<BookRecord> = serde_json::from_str(&content)
            .map_err(|e| Error::CacheCorrupt(format!("{}: {}", self.path.display(), e)))?;

        debug!("loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// Write the table as one pretty-printed JSON array, creating parent
    /// directories as needed. The in-memory table stays authoritative if
    /// this fails.
    pub fn save(&self, records: &[BookRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| Error::CachePersist(format!("{}: {}", parent.display(), e)))?;
            }
        }

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| Error::CachePersist(e.to_string()))?;
        fs::write(&self.path, json)
            .map_err(|e| Error::CachePersist(format!("{}: {}", self.path.display(), e)))?;

        debug!("saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}
