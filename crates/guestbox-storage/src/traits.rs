//! Storage abstraction trait
//!
//! This module defines the ContainerStorage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Container creation failed: {0}")]
    ContainerFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid object name: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte stream handed to a backend for upload
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Stored alongside the objects of every container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerMetadata {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// What a backend records about each stored object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Remote container storage
///
/// A container is a named grouping (a folder) created per submission. Backends
/// return an opaque container id; two containers may share a name.
#[async_trait]
pub trait ContainerStorage: Send + Sync {
    /// Create a container and return its id
    async fn create_container(&self, name: &str) -> StorageResult<String>;

    /// Upload a byte stream into a container and return the object id
    ///
    /// `object_name` is the filename the object is stored under; directory
    /// components are stripped. The reader is consumed until EOF.
    async fn upload_object(
        &self,
        container_id: &str,
        object_name: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: ObjectReader,
    ) -> StorageResult<String>;

    /// Delete an object by the id `upload_object` returned.
    /// Deleting a missing object succeeds.
    async fn delete_object(&self, object_id: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
