use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger store I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger document is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}
