use crate::traits::{LedgerError, LedgerResult, LedgerStore};
use async_trait::async_trait;
use guestbox_core::LedgerEntry;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// Ledger kept in one pretty-printed JSON array file
///
/// Appends are read-modify-write under an async mutex; the rewrite goes
/// through a temp file in the same directory and is renamed into place.
/// Entries already in the file are carried over as raw JSON, so fields this
/// version does not know about survive an append.
pub struct JsonFileLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw entries; a missing file reads as an empty ledger.
    async fn read_raw(&self) -> LedgerResult<Vec<Value>> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(LedgerError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let value: Value = serde_json::from_slice(&raw).map_err(|source| LedgerError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        match value {
            Value::Array(entries) => Ok(entries),
            _ => Err(LedgerError::NotAnArray(self.path.clone())),
        }
    }

    async fn rewrite(&self, entries: &[Value]) -> LedgerResult<()> {
        let bytes = to_pretty_json(entries)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || atomic_write_file(&path, &bytes))
            .await
            .map_err(|e| LedgerError::Task(e.to_string()))?
    }
}

/// JSON with 4-space indentation.
fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> LedgerResult<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Replace `path` with `bytes` via temp file + fsync + rename.
fn atomic_write_file(path: &Path, bytes: &[u8]) -> LedgerResult<()> {
    let write_err = |source: std::io::Error| LedgerError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut named_temp = tempfile::NamedTempFile::new_in(parent_dir(path)).map_err(write_err)?;
    named_temp.as_file_mut().write_all(bytes).map_err(write_err)?;
    named_temp.as_file().sync_all().map_err(write_err)?;
    named_temp
        .persist(path)
        .map_err(|e| write_err(e.error))?;
    Ok(())
}

#[async_trait]
impl LedgerStore for JsonFileLedger {
    async fn initialize(&self) -> LedgerResult<()> {
        let _guard = self.lock.lock().await;

        let dir = parent_dir(&self.path);
        fs::create_dir_all(dir)
            .await
            .map_err(|source| LedgerError::Write {
                path: self.path.clone(),
                source,
            })?;

        match fs::try_exists(&self.path).await {
            Ok(true) => {
                tracing::debug!(path = %self.path.display(), "Ledger already present");
                Ok(())
            }
            Ok(false) => {
                self.rewrite(&[]).await?;
                tracing::info!(path = %self.path.display(), "Ledger created");
                Ok(())
            }
            Err(source) => Err(LedgerError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    async fn append(&self, entry: &LedgerEntry) -> LedgerResult<()> {
        let _guard = self.lock.lock().await;
        let start = std::time::Instant::now();

        let mut entries = self.read_raw().await?;
        entries.push(serde_json::to_value(entry)?);
        self.rewrite(&entries).await?;

        tracing::debug!(
            path = %self.path.display(),
            entries = entries.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Ledger entry appended"
        );
        Ok(())
    }

    async fn entries(&self) -> LedgerResult<Vec<LedgerEntry>> {
        let _guard = self.lock.lock().await;
        let raw = self.read_raw().await?;
        serde_json::from_value(Value::Array(raw)).map_err(|source| LedgerError::Malformed {
            path: self.path.clone(),
            source,
        })
    }
}
