//! Error types module
//!
//! All failures that can reach the intake boundary are unified under `AppError`.
//! Each variant describes how it is presented to the caller through
//! `ErrorMetadata`: status code, stable machine code, client-facing message and
//! log level. Internal error text never crosses the boundary for sensitive
//! variants.

use std::io;

use crate::models::{InvalidTransition, SubmissionStage};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from the client
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or missing submitter fields; rejected before the pipeline runs
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Container creation or file upload failed
    #[error("Storage error at {stage}: {message}")]
    Storage {
        stage: SubmissionStage,
        message: String,
    },

    /// Side effects were applied but the ledger entry could not be written
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Staging error: {0}")]
    Staging(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let field_errors = err.field_errors();
        let mut fields: Vec<&str> = field_errors.keys().map(|field| field.as_ref()).collect();
        fields.sort_unstable();
        AppError::Validation(format!("Missing or blank fields: {}", fields.join(", ")))
    }
}

impl From<InvalidTransition> for AppError {
    fn from(err: InvalidTransition) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::Validation(_) => (400, "VALIDATION_ERROR", false, false, LogLevel::Debug),
        AppError::BadRequest(_) => (400, "BAD_REQUEST", false, false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, false, LogLevel::Debug),
        AppError::Storage { .. } => (502, "STORAGE_ERROR", true, true, LogLevel::Error),
        AppError::Persistence(_) => (500, "PERSISTENCE_ERROR", false, true, LogLevel::Error),
        AppError::Staging(_) => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
        AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Validation(_) => "ValidationError",
            AppError::BadRequest(_) => "BadRequest",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Storage { .. } => "StorageError",
            AppError::Persistence(_) => "PersistenceError",
            AppError::Staging(_) => "StagingError",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Pipeline stage the failure belongs to, if any
    pub fn stage(&self) -> Option<SubmissionStage> {
        match self {
            AppError::Storage { stage, .. } => Some(*stage),
            AppError::Persistence(_) => Some(SubmissionStage::Ledger),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Storage {
                stage: SubmissionStage::Container,
                ..
            } => "Não foi possível criar a pasta de armazenamento.".to_string(),
            AppError::Storage { .. } => "Erro ao compartilhar arquivos.".to_string(),
            AppError::Persistence(_) => {
                "Arquivos e avisos enviados, mas o registro do envio falhou.".to_string()
            }
            AppError::Staging(_) => "Erro ao receber arquivos.".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Erro interno do servidor.".to_string()
            }
        }
    }
}
