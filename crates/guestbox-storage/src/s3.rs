use crate::keys::{self, CONTAINER_METADATA};
use crate::traits::{ContainerMetadata, ContainerStorage, ObjectReader, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use tokio::io::AsyncReadExt;
use uuid::Uuid;

/// Key prefix all containers live under
const CONTAINER_PREFIX: &str = "containers";

/// Highest ` (n)` suffix tried before giving up on a name
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// S3 container storage
///
/// A container is the key prefix `containers/{container_id}/` with a
/// `.container.json` marker object holding its name.
#[derive(Clone)]
pub struct S3ContainerStorage {
    store: AmazonS3,
    bucket: String,
}

impl S3ContainerStorage {
    /// Create a new S3ContainerStorage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3ContainerStorage { store, bucket })
    }

    /// Put options carrying the object's content type
    fn put_options(content_type: &str) -> PutOptions {
        let mut attributes = Attributes::new();
        attributes.insert(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        );
        PutOptions {
            attributes,
            ..Default::default()
        }
    }

    fn location(object_id: &str) -> Path {
        Path::from(format!("{}/{}", CONTAINER_PREFIX, object_id))
    }

    async fn exists(&self, location: &Path) -> StorageResult<bool> {
        match self.store.head(location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    /// First name in `name`, `name (1)`, `name (2)`, ... with no object behind it.
    /// Concurrent uploads of the same name into one container can still race.
    async fn free_object_id(&self, container_id: &str, name: &str) -> StorageResult<String> {
        for n in 0..MAX_NAME_ATTEMPTS {
            let candidate = if n == 0 {
                name.to_string()
            } else {
                keys::numbered_name(name, n)
            };
            if candidate == CONTAINER_METADATA {
                continue;
            }
            let object_id = keys::object_id(container_id, &candidate);
            if !self.exists(&Self::location(&object_id)).await? {
                return Ok(object_id);
            }
        }

        Err(StorageError::UploadFailed(format!(
            "No free object name for {} after {} attempts",
            name, MAX_NAME_ATTEMPTS
        )))
    }
}

#[async_trait]
impl ContainerStorage for S3ContainerStorage {
    async fn create_container(&self, name: &str) -> StorageResult<String> {
        let container_id = Uuid::new_v4().to_string();
        let location = Self::location(&keys::object_id(&container_id, CONTAINER_METADATA));
        let metadata = ContainerMetadata {
            name: name.to_string(),
            created_at: Utc::now(),
        };
        let body = serde_json::to_vec(&metadata)
            .map_err(|e| StorageError::ContainerFailed(e.to_string()))?;

        let start = std::time::Instant::now();
        let result: ObjectResult<_> = self
            .store
            .put(&location, PutPayload::from(Bytes::from(body)))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                container_name = %name,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 container creation failed"
            );
            StorageError::ContainerFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            container_id = %container_id,
            container_name = %name,
            "S3 container created"
        );

        Ok(container_id)
    }

    async fn upload_object(
        &self,
        container_id: &str,
        object_name: &str,
        content_type: &str,
        content_length: Option<u64>,
        mut reader: ObjectReader,
    ) -> StorageResult<String> {
        keys::validate_container_id(container_id)?;
        let name = keys::object_name(object_name)?;

        let marker = Self::location(&keys::object_id(container_id, CONTAINER_METADATA));
        if !self.exists(&marker).await? {
            return Err(StorageError::NotFound(format!(
                "Container {} does not exist",
                container_id
            )));
        }

        let object_id = self.free_object_id(container_id, &name).await?;
        let start = std::time::Instant::now();

        // The whole stream is buffered and sent in a single put.
        let mut buffer = Vec::with_capacity(content_length.unwrap_or(0).min(64 * 1024 * 1024) as usize);
        reader.read_to_end(&mut buffer).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to read from stream: {}", e))
        })?;

        let size = buffer.len() as u64;
        let location = Self::location(&object_id);
        let result: ObjectResult<_> = self
            .store
            .put_opts(
                &location,
                PutPayload::from(Bytes::from(buffer)),
                Self::put_options(content_type),
            )
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                object_id = %object_id,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 stream upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            object_id = %object_id,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            content_type = %content_type,
            "S3 stream upload successful"
        );

        Ok(object_id)
    }

    async fn delete_object(&self, object_id: &str) -> StorageResult<()> {
        keys::split_object_id(object_id)?;
        let location = Self::location(object_id);

        match self.store.delete(&location).await {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    object_id = %object_id,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            object_id = %object_id,
            "S3 delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
