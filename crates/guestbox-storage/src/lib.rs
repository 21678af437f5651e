//! Guestbox Storage Library
//!
//! This crate provides the container storage abstraction used to hold guest
//! media, its local filesystem and S3 implementations, and the local staging
//! area where uploaded files wait until they are pushed to a container.
//!
//! # Object naming
//!
//! Every submission gets its own container, identified by an opaque id the
//! backend returns from `create_container`. Objects are addressed by
//! `{container_id}/{object_name}` where `object_name` is the final path
//! component of the filename the guest submitted. Name handling is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod staging;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use guestbox_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalContainerStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3ContainerStorage;
pub use staging::{mime_kind, StagingArea, StagingError, StagingResult};
pub use traits::{ContainerStorage, ObjectMetadata, ObjectReader, StorageError, StorageResult};
