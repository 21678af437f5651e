//! Local staging area for submitted files.
//!
//! Files are written here as the request streams in and stay until the
//! submission either commits (then they are discarded) or fails (then they are
//! kept for manual recovery).

use crate::keys;
use chrono::{DateTime, Utc};
use guestbox_core::{ContentKind, StagedFile};
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Highest collision counter tried for one storage name
const MAX_COLLISIONS: u32 = 10_000;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Invalid filename: {0:?}")]
    InvalidName(String),

    #[error("No free staging name for {0:?}")]
    Exhausted(String),

    #[error("Staging IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StagingResult<T> = Result<T, StagingError>;

/// Content kind for a filename, by extension only.
pub fn mime_kind(name: &str) -> ContentKind {
    ContentKind::from_filename(name)
}

/// Split at the last `.`; a leading dot belongs to the base.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

fn collapse_whitespace(base: &str) -> String {
    let mut out = String::with_capacity(base.len());
    let mut in_run = false;
    for c in base.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push('_');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Local name for a submitted file: `foto 1.jpg` at `1700000000000` becomes
/// `foto_1-1700000000000.jpg`. `collision` > 0 appends `-{collision}` after
/// the timestamp.
pub fn storage_name(original_name: &str, millis: i64, collision: u32) -> StagingResult<String> {
    let leaf = keys::file_leaf(original_name);
    if leaf.trim().is_empty() || leaf == "." || leaf == ".." {
        return Err(StagingError::InvalidName(original_name.to_string()));
    }

    let (base, extension) = split_extension(leaf);
    let base = collapse_whitespace(base);
    Ok(if collision == 0 {
        format!("{}-{}{}", base, millis, extension)
    } else {
        format!("{}-{}-{}{}", base, millis, collision, extension)
    })
}

#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    pub async fn initialize(&self) -> StagingResult<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Stream `reader` into a new staging file named after `original_name`.
    ///
    /// The file is created with create-new semantics, so concurrent stagings of
    /// the same name in the same millisecond end up in distinct files.
    pub async fn stage<R>(
        &self,
        original_name: &str,
        submitted_at: DateTime<Utc>,
        reader: &mut R,
    ) -> StagingResult<StagedFile>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let millis = submitted_at.timestamp_millis();
        let (name, path, mut file) = self.create_unique(original_name, millis).await?;

        let copied = async {
            let size = tokio::io::copy(reader, &mut file).await?;
            file.flush().await?;
            file.sync_all().await?;
            Ok::<u64, std::io::Error>(size)
        }
        .await;

        let size_bytes = match copied {
            Ok(size) => size,
            Err(e) => {
                drop(file);
                if let Err(cleanup) = fs::remove_file(&path).await {
                    tracing::warn!(
                        error = %cleanup,
                        path = %path.display(),
                        "Failed to remove partially staged file"
                    );
                }
                return Err(e.into());
            }
        };

        tracing::debug!(
            file = %original_name,
            storage_name = %name,
            size_bytes,
            "File staged"
        );

        Ok(StagedFile {
            original_name: original_name.to_string(),
            content_kind: mime_kind(original_name),
            storage_name: name,
            size_bytes,
            path,
        })
    }

    async fn create_unique(
        &self,
        original_name: &str,
        millis: i64,
    ) -> StagingResult<(String, PathBuf, fs::File)> {
        for collision in 0..MAX_COLLISIONS {
            let name = storage_name(original_name, millis, collision)?;
            let path = self.dir.join(&name);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((name, path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(StagingError::Exhausted(original_name.to_string()))
    }

    /// Open the staged bytes for reading.
    pub async fn open(&self, file: &StagedFile) -> StagingResult<fs::File> {
        Ok(fs::File::open(&file.path).await?)
    }

    /// Remove a staged file. A file that is already gone is not an error.
    pub async fn discard(&self, file: &StagedFile) -> StagingResult<()> {
        match fs::remove_file(&file.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
