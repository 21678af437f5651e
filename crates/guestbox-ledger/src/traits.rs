use async_trait::async_trait;
use guestbox_core::LedgerEntry;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Failed to read ledger {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write ledger {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Ledger {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Ledger {0} does not contain a JSON array")]
    NotAnArray(PathBuf),

    #[error("Failed to serialize ledger entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Ledger task failed: {0}")]
    Task(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Append-only store of committed submissions
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Create the backing store if it is missing. Never truncates.
    async fn initialize(&self) -> LedgerResult<()>;

    /// Append one entry, keeping every entry already recorded.
    async fn append(&self, entry: &LedgerEntry) -> LedgerResult<()>;

    /// All entries, oldest first.
    async fn entries(&self) -> LedgerResult<Vec<LedgerEntry>>;
}
