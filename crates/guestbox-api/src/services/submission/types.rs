//! Types used by the submission orchestrator

use std::time::Duration;

use guestbox_core::{
    AppError, Config, InvalidTransition, LedgerEntry, NotificationTarget, SubmissionStage,
    SubmissionStatus,
};
use guestbox_ledger::LedgerError;
use guestbox_storage::StorageError;
use uuid::Uuid;

/// Pipeline knobs taken from configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Uploads in flight at once; 1 uploads strictly one after another
    pub upload_concurrency: usize,
    /// Delete already-uploaded objects when a later upload fails
    pub rollback_partial_uploads: bool,
    /// Bound on every storage and messaging call
    pub external_call_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            upload_concurrency: 1,
            rollback_partial_uploads: false,
            external_call_timeout: Duration::from_secs(60),
        }
    }
}

impl OrchestratorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            upload_concurrency: config.upload_concurrency().max(1),
            rollback_partial_uploads: config.rollback_partial_uploads(),
            external_call_timeout: Duration::from_secs(config.external_call_timeout_secs()),
        }
    }
}

/// Outcome of one notification send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub target: NotificationTarget,
    /// `None` when the message was delivered
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn delivered(&self) -> bool {
        self.error.is_none()
    }
}

/// What a committed submission did
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub submission_id: Uuid,
    pub status: SubmissionStatus,
    pub container_id: Option<String>,
    /// Object ids, in submission order
    pub uploaded: Vec<String>,
    /// Every send attempted, in the order it was made
    pub deliveries: Vec<DeliveryOutcome>,
    pub entry: LedgerEntry,
}

impl SubmissionReport {
    pub fn failed_deliveries(&self) -> impl Iterator<Item = &DeliveryOutcome> {
        self.deliveries.iter().filter(|d| !d.delivered())
    }
}

/// Why a submission did not reach `Committed`
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Container creation failed: {0}")]
    Container(#[source] StorageError),

    /// `uploaded` files made it into the container before `file` failed
    #[error("Upload of {file:?} failed after {uploaded} uploaded file(s): {source}")]
    Upload {
        file: String,
        uploaded: usize,
        #[source]
        source: StorageError,
    },

    /// Storage and notifications already happened; only the record is missing
    #[error("Ledger append failed: {0}")]
    Ledger(#[source] LedgerError),

    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

impl SubmissionError {
    pub fn stage(&self) -> Option<SubmissionStage> {
        match self {
            SubmissionError::Container(_) => Some(SubmissionStage::Container),
            SubmissionError::Upload { .. } => Some(SubmissionStage::Upload),
            SubmissionError::Ledger(_) => Some(SubmissionStage::Ledger),
            SubmissionError::Transition(_) => None,
        }
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Container(e) => AppError::Storage {
                stage: SubmissionStage::Container,
                message: e.to_string(),
            },
            err @ SubmissionError::Upload { .. } => AppError::Storage {
                stage: SubmissionStage::Upload,
                message: err.to_string(),
            },
            SubmissionError::Ledger(e) => AppError::Persistence(e.to_string()),
            SubmissionError::Transition(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guestbox_core::ErrorMetadata;

    #[test]
    fn upload_failure_maps_to_storage_error_at_upload_stage() {
        let err = SubmissionError::Upload {
            file: "b.jpg".to_string(),
            uploaded: 1,
            source: StorageError::UploadFailed("quota".to_string()),
        };
        assert_eq!(err.stage(), Some(SubmissionStage::Upload));

        let app: AppError = err.into();
        assert_eq!(app.error_code(), "STORAGE_ERROR");
        assert_eq!(app.stage(), Some(SubmissionStage::Upload));
        assert!(app.to_string().contains("b.jpg"));
    }

    #[test]
    fn ledger_failure_maps_to_persistence_error() {
        let err = SubmissionError::Ledger(LedgerError::Task("cancelled".to_string()));
        let app: AppError = err.into();
        assert_eq!(app.error_code(), "PERSISTENCE_ERROR");
        assert_eq!(app.stage(), Some(SubmissionStage::Ledger));
    }

    #[test]
    fn container_failure_maps_to_container_stage() {
        let app: AppError =
            SubmissionError::Container(StorageError::ContainerFailed("auth".to_string())).into();
        assert_eq!(app.http_status_code(), 502);
        assert_eq!(app.stage(), Some(SubmissionStage::Container));
    }
}
