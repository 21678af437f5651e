//! Submission orchestrator
//!
//! Drives one guest submission through its lifecycle:
//! create container → upload files → notify → commit ledger entry.
//! Storage failures abort the submission; notification failures are logged and
//! skipped; a ledger failure is reported as "effects applied, not recorded".

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use futures::stream::{self, StreamExt};
use guestbox_core::{
    GuestContact, GuestSubmission, LedgerEntry, NotificationRecipients, NotificationTarget,
    RecipientRole, StagedFile, SubmissionStage, SubmissionStatus,
};
use guestbox_ledger::LedgerStore;
use guestbox_services::{Messenger, MessagingError};
use guestbox_storage::{ContainerStorage, ObjectReader, StagingArea, StorageError, StorageResult};

use super::notice::{fan_out_notice, thank_you};
use super::types::{DeliveryOutcome, OrchestratorConfig, SubmissionError, SubmissionReport};

/// First failing upload, plus every object that did make it into the container
struct UploadFailure {
    file: String,
    uploaded: Vec<String>,
    source: StorageError,
}

#[derive(Clone)]
pub struct SubmissionOrchestrator {
    storage: Arc<dyn ContainerStorage>,
    messenger: Arc<dyn Messenger>,
    ledger: Arc<dyn LedgerStore>,
    staging: StagingArea,
    recipients: NotificationRecipients,
    config: OrchestratorConfig,
}

impl SubmissionOrchestrator {
    pub fn new(
        storage: Arc<dyn ContainerStorage>,
        messenger: Arc<dyn Messenger>,
        ledger: Arc<dyn LedgerStore>,
        staging: StagingArea,
        recipients: NotificationRecipients,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            storage,
            messenger,
            ledger,
            staging,
            recipients,
            config,
        }
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Data-only path: fan-out notice, then commit. No storage calls.
    pub async fn submit_contact_only(
        &self,
        guest: GuestContact,
        submitted_at: DateTime<Utc>,
    ) -> Result<SubmissionReport, SubmissionError> {
        let mut submission = GuestSubmission::new(guest, Vec::new(), submitted_at);
        tracing::info!(submission_id = %submission.id, "Data-only submission received");

        let deliveries = self.notify(&submission, None).await;
        submission.transition(SubmissionStatus::Notified)?;

        self.commit(&mut submission, Vec::new(), deliveries).await
    }

    /// Full-sharing path: container, uploads, notifications, commit.
    ///
    /// `files` must already be in the staging area; they are discarded once
    /// the submission commits and kept otherwise.
    pub async fn submit_with_media(
        &self,
        guest: GuestContact,
        files: Vec<StagedFile>,
        submitted_at: DateTime<Utc>,
    ) -> Result<SubmissionReport, SubmissionError> {
        let mut submission = GuestSubmission::new(guest, files, submitted_at);
        let container_name = submission.container_name();
        tracing::info!(
            submission_id = %submission.id,
            files = submission.files.len(),
            container_name = %container_name,
            "Media submission received"
        );

        // Received → ContainerCreated
        let container_id = match self
            .bounded(self.storage.create_container(&container_name))
            .await
        {
            Ok(id) => id,
            Err(e) => {
                submission.fail(SubmissionStage::Container);
                tracing::error!(
                    submission_id = %submission.id,
                    stage = %SubmissionStage::Container,
                    container_name = %container_name,
                    error = %e,
                    "Container creation failed"
                );
                return Err(SubmissionError::Container(e));
            }
        };
        tracing::debug!(
            submission_id = %submission.id,
            container_id = %container_id,
            container_name = %container_name,
            "Container created; same-named containers are told apart by id"
        );
        submission.attach_container(container_id.clone())?;

        // ContainerCreated → FilesUploaded
        let uploaded = match self.upload_all(&submission, &container_id).await {
            Ok(uploaded) => uploaded,
            Err(failure) => {
                submission.fail(SubmissionStage::Upload);
                tracing::error!(
                    submission_id = %submission.id,
                    stage = %SubmissionStage::Upload,
                    container_id = %container_id,
                    file = %failure.file,
                    uploaded = failure.uploaded.len(),
                    error = %failure.source,
                    "Upload failed; staged files kept"
                );
                if self.config.rollback_partial_uploads {
                    self.roll_back(&failure.uploaded).await;
                }
                return Err(SubmissionError::Upload {
                    file: failure.file,
                    uploaded: failure.uploaded.len(),
                    source: failure.source,
                });
            }
        };
        submission.transition(SubmissionStatus::FilesUploaded)?;

        // FilesUploaded → Notified
        let deliveries = self.notify(&submission, Some(&container_name)).await;
        submission.transition(SubmissionStatus::Notified)?;

        // Notified → Committed
        let report = self.commit(&mut submission, uploaded, deliveries).await?;
        self.discard_staged(&submission.files).await;
        Ok(report)
    }

    /// Apply the external call timeout to a storage call.
    async fn bounded<T, F>(&self, call: F) -> StorageResult<T>
    where
        F: Future<Output = StorageResult<T>>,
    {
        let limit = self.config.external_call_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(limit)),
        }
    }

    /// Upload every staged file in submission order.
    ///
    /// Up to `upload_concurrency` uploads run at once and results are consumed
    /// in submission order. After the first failure no new upload starts, but
    /// the ones already in flight are awaited before returning.
    async fn upload_all(
        &self,
        submission: &GuestSubmission,
        container_id: &str,
    ) -> Result<Vec<String>, UploadFailure> {
        let halted = AtomicBool::new(false);
        let halted = &halted;

        let mut uploads = stream::iter(submission.files.iter().cloned())
            .map(|file| async move {
                if halted.load(Ordering::SeqCst) {
                    return (file, None);
                }
                let result = self.upload_one(container_id, &file).await;
                if result.is_err() {
                    halted.store(true, Ordering::SeqCst);
                }
                (file, Some(result))
            })
            .buffered(self.config.upload_concurrency.max(1));

        let mut uploaded = Vec::with_capacity(submission.files.len());
        let mut first_failure: Option<(String, StorageError)> = None;

        while let Some((file, result)) = uploads.next().await {
            match result {
                Some(Ok(object_id)) => uploaded.push(object_id),
                Some(Err(e)) if first_failure.is_none() => {
                    first_failure = Some((file.original_name, e));
                }
                Some(Err(e)) => {
                    tracing::warn!(file = %file.original_name, error = %e, "Further upload failed");
                }
                None => {
                    tracing::debug!(file = %file.original_name, "Upload skipped after earlier failure");
                }
            }
        }

        match first_failure {
            None => Ok(uploaded),
            Some((file, source)) => Err(UploadFailure {
                file,
                uploaded,
                source,
            }),
        }
    }

    async fn upload_one(&self, container_id: &str, file: &StagedFile) -> StorageResult<String> {
        let start = std::time::Instant::now();
        let reader: ObjectReader = match self.staging.open(file).await {
            Ok(handle) => Box::pin(handle),
            Err(e) => {
                return Err(StorageError::UploadFailed(format!(
                    "Staged file {} unavailable: {}",
                    file.storage_name, e
                )))
            }
        };

        let object_id = self
            .bounded(self.storage.upload_object(
                container_id,
                &file.original_name,
                file.content_kind.mime_type(),
                Some(file.size_bytes),
                reader,
            ))
            .await?;

        tracing::info!(
            container_id = %container_id,
            file = %file.original_name,
            object_id = %object_id,
            size_bytes = file.size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File uploaded"
        );
        Ok(object_id)
    }

    /// Best-effort compensating delete; failures are logged only.
    async fn roll_back(&self, object_ids: &[String]) {
        for object_id in object_ids {
            match self.bounded(self.storage.delete_object(object_id)).await {
                Ok(()) => tracing::info!(object_id = %object_id, "Rolled back uploaded object"),
                Err(e) => tracing::warn!(
                    object_id = %object_id,
                    error = %e,
                    "Failed to roll back uploaded object"
                ),
            }
        }
    }

    /// Thank-you to the guest (file-sharing path only), then the notice to
    /// every fan-out target. Each send is awaited on its own and never aborts
    /// the ones after it.
    async fn notify(
        &self,
        submission: &GuestSubmission,
        container_name: Option<&str>,
    ) -> Vec<DeliveryOutcome> {
        let mut deliveries = Vec::new();

        if container_name.is_some() {
            let target =
                NotificationTarget::new(submission.guest.phone.clone(), RecipientRole::Submitter);
            deliveries.push(self.deliver(target, &thank_you(&submission.guest)).await);
        }

        let local_time = submission.submitted_at.with_timezone(&Local);
        let notice = fan_out_notice(&submission.guest, &local_time, container_name);
        for target in self.recipients.fan_out_targets() {
            deliveries.push(self.deliver(target, &notice).await);
        }

        deliveries
    }

    async fn deliver(&self, target: NotificationTarget, text: &str) -> DeliveryOutcome {
        let limit = self.config.external_call_timeout;
        let start = std::time::Instant::now();
        let result = match tokio::time::timeout(limit, self.messenger.send(&target.recipient, text))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(MessagingError::Timeout(limit)),
        };

        match result {
            Ok(()) => {
                tracing::debug!(
                    recipient = %target.recipient,
                    role = %target.role,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Notification delivered"
                );
                DeliveryOutcome {
                    target,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(
                    recipient = %target.recipient,
                    role = %target.role,
                    error = %e,
                    "Notification failed; continuing"
                );
                DeliveryOutcome {
                    target,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Notified → Committed
    async fn commit(
        &self,
        submission: &mut GuestSubmission,
        uploaded: Vec<String>,
        deliveries: Vec<DeliveryOutcome>,
    ) -> Result<SubmissionReport, SubmissionError> {
        let entry = LedgerEntry::from(&*submission);

        if let Err(e) = self.ledger.append(&entry).await {
            submission.fail(SubmissionStage::Ledger);
            tracing::error!(
                submission_id = %submission.id,
                stage = %SubmissionStage::Ledger,
                container_id = ?submission.container_id(),
                error = %e,
                "Submission effects applied but ledger append failed"
            );
            return Err(SubmissionError::Ledger(e));
        }
        submission.transition(SubmissionStatus::Committed)?;

        tracing::info!(
            submission_id = %submission.id,
            container_id = ?submission.container_id(),
            files = entry.files.len(),
            failed_deliveries = deliveries.iter().filter(|d| !d.delivered()).count(),
            "Submission committed"
        );

        Ok(SubmissionReport {
            submission_id: submission.id,
            status: submission.status(),
            container_id: submission.container_id().map(String::from),
            uploaded,
            deliveries,
            entry,
        })
    }

    async fn discard_staged(&self, files: &[StagedFile]) {
        for file in files {
            if let Err(e) = self.staging.discard(file).await {
                tracing::warn!(
                    file = %file.storage_name,
                    error = %e,
                    "Failed to discard staged file"
                );
            }
        }
    }
}
