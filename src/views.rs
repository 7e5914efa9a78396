//! Page-view counter collaborator.
//!
//! `ViewCounter` persists a key → count map as a single JSON file and
//! supports increment-by-one plus bulk read. Every operation reads and then
//! rewrites the whole file.
//!
//! ### I/O characteristics & caveats
//! - File writes are not atomic and there is **no** locking: concurrent
//!   increments from separate requests may lose updates (last write wins).
//!   That is an accepted property of this collaborator, not a bug to fix.
//! - A missing or corrupt file reads as an empty map.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

/// A JSON-file-backed view counter.
pub struct ViewCounter {
    /// Path to the JSON file where counts are stored.
    path: PathBuf,
}

impl ViewCounter {
    /// Creates a counter over `path`. The file is created lazily on the
    /// first increment.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Increments the count for `key` (starting from 0) and returns the new
    /// value.
    pub fn increment_view(&self, key: &str) -> Result<u64> {
        let mut counts = self.load_file();
        let count = counts.entry(key.to_string()).or_insert(0);
        *count += 1;
        let count = *count;

        self.save_file(&counts)?;
        Ok(count)
    }

    /// Returns the full current map of counts.
    pub fn get_all_views(&self) -> Result<HashMap<String, u64>> {
        Ok(self.load_file())
    }

    /// Loads and deserializes the counts file.
    ///
    /// Returns an empty map if the file is missing or does not deserialize.
    fn load_file(&self) -> HashMap<String, u64> {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return HashMap::new();
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            debug!("view counter file did not parse, starting fresh: {e}");
            HashMap::new()
        })
    }

    /// Serializes and writes the counts file (pretty-printed).
    fn save_file(&self, counts: &HashMap<String, u64>) -> Result<()> {
        let contents = serde_json::to_string_pretty(counts).context("serialize view counts")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("write view counts to {}", self.path.display()))
    }
}
