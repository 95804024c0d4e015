//! Results Ledger
//!
//! Append-only JSON array of analysis results in `grading_results.json`
//! (the filename is part of the frontend contract). Reads of a missing
//! file yield an empty ledger.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use crate::types::ResultEntry;

/// File-backed store for analysis results. Clones share the same
/// write lock, so one store handed to both the HTTP handlers and the
/// email worker serializes their appends.
#[derive(Clone, Debug)]
pub struct ResultsStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl ResultsStore {
    pub fn new(path: PathBuf) -> Self {
        ResultsStore {
            path,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Read every entry; a missing file is an empty ledger.
    pub fn read_all(&self) -> Result<Vec<ResultEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let entries: Vec<ResultEntry> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(entries)
    }

    /// Append one entry: read, push, rewrite. Writers hold the store
    /// lock for the whole read-modify-write, and the rewrite lands via
    /// a sibling temp file plus rename, so a concurrent `read_all`
    /// never sees a half-written ledger.
    pub fn append(&self, entry: ResultEntry) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut entries = self.read_all()?;
        entries.push(entry);

        let json = serde_json::to_string_pretty(&entries)
            .context("Failed to serialize results ledger")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
