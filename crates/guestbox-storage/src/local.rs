use crate::keys::{self, CONTAINER_METADATA, OBJECT_METADATA_DIR};
use crate::traits::{
    ContainerMetadata, ContainerStorage, ObjectMetadata, ObjectReader, StorageError,
    StorageResult,
};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Highest ` (n)` suffix tried before giving up on a name
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Local filesystem container storage
///
/// Containers are directories named by their id under `base_path`; the
/// human-readable name lives in `.container.json` inside the directory and
/// each object's content type in `.objects/{name}.json`.
#[derive(Clone)]
pub struct LocalContainerStorage {
    base_path: PathBuf,
}

impl LocalContainerStorage {
    /// Create a new LocalContainerStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for containers (e.g., "/var/lib/guestbox/containers")
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalContainerStorage { base_path })
    }

    fn container_path(&self, container_id: &str) -> StorageResult<PathBuf> {
        keys::validate_container_id(container_id)?;
        Ok(self.base_path.join(container_id))
    }

    /// Read back the metadata of a container
    pub async fn container_metadata(&self, container_id: &str) -> StorageResult<ContainerMetadata> {
        let path = self.container_path(container_id)?.join(CONTAINER_METADATA);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(container_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&raw).map_err(|e| StorageError::BackendError(e.to_string()))
    }

    /// Read back what was recorded about an uploaded object
    pub async fn object_metadata(&self, object_id: &str) -> StorageResult<ObjectMetadata> {
        let (container_id, name) = keys::split_object_id(object_id)?;
        let path = Self::object_metadata_path(&self.container_path(container_id)?, name);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(object_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&raw).map_err(|e| StorageError::BackendError(e.to_string()))
    }

    fn object_metadata_path(container_dir: &Path, name: &str) -> PathBuf {
        container_dir
            .join(OBJECT_METADATA_DIR)
            .join(format!("{}.json", name))
    }

    /// Hidden part file in the container; removed when the returned path drops.
    fn create_part(container_dir: &Path) -> StorageResult<(std::fs::File, TempPath)> {
        match tempfile::Builder::new()
            .prefix(".")
            .suffix(".part")
            .tempfile_in(container_dir)
        {
            Ok(part) => Ok(part.into_parts()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(format!(
                "Container {} does not exist",
                container_dir.display()
            ))),
            Err(e) => Err(StorageError::UploadFailed(format!(
                "Failed to create file in {}: {}",
                container_dir.display(),
                e
            ))),
        }
    }

    /// Move a finished part file to `name`, or `name (n)` if taken
    fn persist_unique(container_dir: &Path, name: &str, mut part: TempPath) -> StorageResult<String> {
        for n in 0..MAX_NAME_ATTEMPTS {
            let candidate = if n == 0 {
                name.to_string()
            } else {
                keys::numbered_name(name, n)
            };
            if keys::is_reserved(&candidate) {
                continue;
            }

            match part.persist_noclobber(container_dir.join(&candidate)) {
                Ok(()) => return Ok(candidate),
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => part = e.path,
                Err(e) => {
                    return Err(StorageError::UploadFailed(format!(
                        "Failed to store {} in {}: {}",
                        candidate,
                        container_dir.display(),
                        e.error
                    )))
                }
            }
        }

        Err(StorageError::UploadFailed(format!(
            "No free object name for {} after {} attempts",
            name, MAX_NAME_ATTEMPTS
        )))
    }
}

#[async_trait]
impl ContainerStorage for LocalContainerStorage {
    async fn create_container(&self, name: &str) -> StorageResult<String> {
        let container_id = Uuid::new_v4().to_string();
        let dir = self.base_path.join(&container_id);

        fs::create_dir_all(dir.join(OBJECT_METADATA_DIR)).await.map_err(|e| {
            StorageError::ContainerFailed(format!(
                "Failed to create container directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let metadata = ContainerMetadata {
            name: name.to_string(),
            created_at: Utc::now(),
        };
        let raw = serde_json::to_vec_pretty(&metadata)
            .map_err(|e| StorageError::ContainerFailed(e.to_string()))?;
        fs::write(dir.join(CONTAINER_METADATA), raw)
            .await
            .map_err(|e| {
                StorageError::ContainerFailed(format!(
                    "Failed to write container metadata in {}: {}",
                    dir.display(),
                    e
                ))
            })?;

        tracing::info!(
            container_id = %container_id,
            container_name = %name,
            path = %dir.display(),
            "Local container created"
        );

        Ok(container_id)
    }

    async fn upload_object(
        &self,
        container_id: &str,
        object_name: &str,
        content_type: &str,
        _content_length: Option<u64>,
        mut reader: ObjectReader,
    ) -> StorageResult<String> {
        let dir = self.container_path(container_id)?;
        let name = keys::object_name(object_name)?;
        let start = std::time::Instant::now();

        // Bytes go to a hidden part file; the object only appears under its
        // name once fully written and synced.
        let (part_file, part_path) = Self::create_part(&dir)?;
        let mut file = fs::File::from_std(part_file);

        let bytes_copied = tokio::io::copy(&mut reader, &mut file)
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write stream to file {}: {}",
                    part_path.display(),
                    e
                ))
            })?;

        file.flush().await?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to sync file {}: {}",
                part_path.display(),
                e
            ))
        })?;
        drop(file);

        let stored_name = Self::persist_unique(&dir, &name, part_path)?;
        let path = dir.join(&stored_name);

        let metadata = ObjectMetadata {
            content_type: content_type.to_string(),
            size_bytes: bytes_copied,
            uploaded_at: Utc::now(),
        };
        let written = match serde_json::to_vec_pretty(&metadata) {
            Ok(raw) => fs::write(Self::object_metadata_path(&dir, &stored_name), raw)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(e) = written {
            let _ = fs::remove_file(&path).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to record metadata for {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            container_id = %container_id,
            object_name = %stored_name,
            content_type = %content_type,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream upload successful"
        );

        Ok(keys::object_id(container_id, &stored_name))
    }

    async fn delete_object(&self, object_id: &str) -> StorageResult<()> {
        let (container_id, name) = keys::split_object_id(object_id)?;
        let dir = self.container_path(container_id)?;
        let path = dir.join(name);

        match fs::remove_file(Self::object_metadata_path(&dir, name)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(object_id = %object_id, error = %e, "Failed to remove object metadata")
            }
        }

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        tracing::info!(
            path = %path.display(),
            object_id = %object_id,
            "Local storage delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
