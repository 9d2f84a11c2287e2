//! Persisted per-sound history ledger.
//!
//! The ledger is the only process-wide mutable state in the pipeline: a
//! retention-bounded sequence of (date, total, growth) snapshots per sound,
//! persisted as one JSON document. Everything else is rebuilt per run and
//! only reads snapshots of this state.

pub mod error;
pub mod ledger;
pub mod store;

pub use error::LedgerError;
pub use ledger::HistoryLedger;
pub use store::{HistoryStore, JsonFileStore, MemoryStore};
