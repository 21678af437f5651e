//! Test helpers: build the orchestrator and router over in-memory doubles.
//!
//! Run from workspace root: `cargo test -p guestbox-api`.

#![allow(dead_code)]

pub mod mocks;

use axum_test::TestServer;
use chrono::{DateTime, TimeZone, Utc};
use guestbox_api::setup::routes;
use guestbox_api::state::AppState;
use guestbox_api::{OrchestratorConfig, SubmissionOrchestrator};
use guestbox_core::{Config, GuestContact, NotificationRecipients, StagedFile};
use guestbox_ledger::{JsonFileLedger, LedgerStore};
use guestbox_storage::StagingArea;
use mocks::{MockMessenger, MockStorage};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const SUBJECT: &str = "5513000000001";
pub const ORGANIZER: &str = "5513000000002";
pub const GUEST_PHONE: &str = "5511900000000";

pub fn guest() -> GuestContact {
    GuestContact {
        name: "Ana".to_string(),
        surname: "Silva".to_string(),
        phone: GUEST_PHONE.to_string(),
        birth_date: "2010-05-01".to_string(),
    }
}

pub fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("SUBJECT_RECIPIENT", SUBJECT),
        ("ORGANIZER_RECIPIENT", ORGANIZER),
        ("STORAGE_BACKEND", "local"),
        ("MESSAGING_BACKEND", "log"),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("Failed to build test config")
}

/// Orchestrator wired to mocks, a JSON ledger and a staging area in a temp dir.
pub struct TestHarness {
    pub storage: Arc<MockStorage>,
    pub messenger: Arc<MockMessenger>,
    pub ledger: Arc<dyn LedgerStore>,
    pub staging: StagingArea,
    pub orchestrator: SubmissionOrchestrator,
    pub ledger_path: PathBuf,
    pub _temp_dir: TempDir,
}

pub struct HarnessBuilder {
    storage: MockStorage,
    messenger: MockMessenger,
    ledger: Option<Arc<dyn LedgerStore>>,
    config: OrchestratorConfig,
}

impl HarnessBuilder {
    pub fn storage(mut self, storage: MockStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn messenger(mut self, messenger: MockMessenger) -> Self {
        self.messenger = messenger;
        self
    }

    pub fn ledger(mut self, ledger: Arc<dyn LedgerStore>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn upload_concurrency(mut self, n: usize) -> Self {
        self.config.upload_concurrency = n;
        self
    }

    pub fn rollback_partial_uploads(mut self) -> Self {
        self.config.rollback_partial_uploads = true;
        self
    }

    pub fn external_call_timeout(mut self, timeout: Duration) -> Self {
        self.config.external_call_timeout = timeout;
        self
    }

    pub async fn build(self) -> TestHarness {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let ledger_path = temp_dir.path().join("dados_convidados.json");

        let ledger = match self.ledger {
            Some(ledger) => ledger,
            None => Arc::new(JsonFileLedger::new(&ledger_path)),
        };
        ledger.initialize().await.expect("Failed to initialize ledger");

        let staging = StagingArea::new(temp_dir.path().join("uploads"));
        staging
            .initialize()
            .await
            .expect("Failed to initialize staging");

        let storage = Arc::new(self.storage);
        let messenger = Arc::new(self.messenger);
        let orchestrator = SubmissionOrchestrator::new(
            storage.clone(),
            messenger.clone(),
            ledger.clone(),
            staging.clone(),
            NotificationRecipients::new(SUBJECT, ORGANIZER),
            self.config,
        );

        TestHarness {
            storage,
            messenger,
            ledger,
            staging,
            orchestrator,
            ledger_path,
            _temp_dir: temp_dir,
        }
    }
}

impl TestHarness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            storage: MockStorage::new(),
            messenger: MockMessenger::new(),
            ledger: None,
            config: OrchestratorConfig::default(),
        }
    }

    pub async fn new() -> Self {
        Self::builder().build().await
    }

    /// Stage `(name, content)` pairs as one submission would.
    pub async fn stage(&self, files: &[(&str, &str)]) -> Vec<StagedFile> {
        let mut staged = Vec::with_capacity(files.len());
        for (name, content) in files {
            let mut reader = content.as_bytes();
            staged.push(
                self.staging
                    .stage(name, submitted_at(), &mut reader)
                    .await
                    .expect("Failed to stage file"),
            );
        }
        staged
    }

    pub fn staged_file_count(&self) -> usize {
        std::fs::read_dir(self.staging.dir())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Router over this harness, as served in production.
    pub fn server(&self) -> TestServer {
        let state = Arc::new(AppState {
            config: test_config(),
            orchestrator: self.orchestrator.clone(),
            ledger: self.ledger.clone(),
        });
        let app = routes::setup_routes(&test_config(), state).expect("Failed to setup routes");
        TestServer::new(app).expect("Failed to create test server")
    }
}
