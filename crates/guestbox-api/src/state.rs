//! Application state shared by every handler.

use guestbox_core::Config;
use guestbox_ledger::LedgerStore;
use std::sync::Arc;

use crate::services::submission::SubmissionOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub orchestrator: SubmissionOrchestrator,
    /// Same ledger the orchestrator appends to; read by the health check
    pub ledger: Arc<dyn LedgerStore>,
}
