//! Guestbox Core Library
//!
//! This crate provides the domain models, error types and configuration shared
//! by every Guestbox component: the guest submission and its lifecycle, staged
//! files, notification targets and the ledger entry shape.

pub mod backend_types;
pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use backend_types::{MessagingBackend, StorageBackend};
pub use config::{BaseConfig, Config, IntakeConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    ContentKind, GuestContact, GuestSubmission, InvalidTransition, LedgerEntry,
    NotificationRecipients, NotificationTarget, RecipientRole, StagedFile, SubmissionRequest,
    SubmissionStage, SubmissionStatus,
};
