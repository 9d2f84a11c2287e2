//! Storage backends for the history ledger.
//!
//! The ledger logic is written against the [`HistoryStore`] trait so the
//! persisted file can be swapped for an in-memory double in tests and demo
//! runs. Both backends hold the complete document: one flat array of
//! per-sound history records.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use soundspike_core::SoundHistory;

use crate::error::LedgerError;

/// A flat keyed store for the full set of per-sound histories. Load and
/// save always move the whole document; the per-sound granularity lives in
/// [`crate::HistoryLedger`], not here.
pub trait HistoryStore: Send {
    /// Read the full ledger document. An absent document is an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on I/O failure or a corrupt document.
    fn load(&self) -> Result<Vec<SoundHistory>, LedgerError>;

    /// Replace the full ledger document.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on I/O or serialization failure.
    fn save(&self, histories: &[SoundHistory]) -> Result<(), LedgerError>;
}

/// File-backed store: one JSON document surviving process restarts within a
/// single installation. Not shared across installations; no
/// conflict-resolution story (single-writer assumption).
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_err(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<Vec<SoundHistory>, LedgerError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, histories: &[SoundHistory]) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent().filter(|p| *p != Path::new("")) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let json = serde_json::to_string(histories)?;

        // Write-then-rename so a crash mid-write never leaves a truncated
        // document behind.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_err(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        Ok(())
    }
}

/// In-memory store double for tests and demo runs.
#[derive(Default)]
pub struct MemoryStore {
    histories: Mutex<Vec<SoundHistory>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Vec<SoundHistory>, LedgerError> {
        Ok(self.histories.lock().expect("store mutex poisoned").clone())
    }

    fn save(&self, histories: &[SoundHistory]) -> Result<(), LedgerError> {
        *self.histories.lock().expect("store mutex poisoned") = histories.to_vec();
        Ok(())
    }
}
