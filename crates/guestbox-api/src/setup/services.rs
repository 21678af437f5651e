//! Ledger, staging, messaging and orchestrator wiring

use anyhow::{Context, Result};
use guestbox_core::Config;
use guestbox_ledger::{JsonFileLedger, LedgerStore};
use guestbox_storage::{ContainerStorage, StagingArea};
use std::sync::Arc;

use crate::services::submission::{OrchestratorConfig, SubmissionOrchestrator};
use crate::state::AppState;

pub async fn initialize_services(
    config: &Config,
    storage: Arc<dyn ContainerStorage>,
) -> Result<Arc<AppState>> {
    let ledger: Arc<dyn LedgerStore> = Arc::new(JsonFileLedger::new(config.ledger_path()));
    ledger
        .initialize()
        .await
        .with_context(|| format!("Failed to initialize ledger at {}", config.ledger_path()))?;
    tracing::info!(path = %config.ledger_path(), "Ledger ready");

    let staging = StagingArea::new(config.staging_dir());
    staging
        .initialize()
        .await
        .with_context(|| format!("Failed to create staging dir {}", config.staging_dir()))?;
    tracing::info!(dir = %config.staging_dir(), "Staging area ready");

    let messenger = guestbox_services::create_messenger(config)
        .context("Failed to initialize messaging backend")?;
    tracing::info!(backend = messenger.backend_name(), "Messaging initialized");

    let recipients = config
        .notification_recipients()
        .context("Notification recipients are not configured")?;

    let orchestrator_config = OrchestratorConfig::from_config(config);
    tracing::info!(
        upload_concurrency = orchestrator_config.upload_concurrency,
        rollback_partial_uploads = orchestrator_config.rollback_partial_uploads,
        external_call_timeout_secs = orchestrator_config.external_call_timeout.as_secs(),
        "Submission pipeline configured"
    );

    let orchestrator = SubmissionOrchestrator::new(
        storage,
        messenger,
        ledger.clone(),
        staging,
        recipients,
        orchestrator_config,
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        orchestrator,
        ledger,
    }))
}
