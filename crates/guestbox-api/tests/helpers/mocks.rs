//! In-memory storage, messaging and ledger doubles with failure injection.

#![allow(dead_code)]

use async_trait::async_trait;
use guestbox_core::{LedgerEntry, StorageBackend};
use guestbox_ledger::{LedgerError, LedgerResult, LedgerStore};
use guestbox_services::{Messenger, MessagingError, MessagingResult};
use guestbox_storage::{ContainerStorage, ObjectReader, StorageError, StorageResult};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::AsyncReadExt;

/// Object recorded by `MockStorage`
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
struct StorageState {
    /// container id -> container name
    containers: BTreeMap<String, String>,
    /// object id -> object
    objects: BTreeMap<String, StoredObject>,
    /// object ids in the order their upload finished
    upload_order: Vec<String>,
    deleted: Vec<String>,
    calls: usize,
}

/// Container storage kept in memory.
#[derive(Default)]
pub struct MockStorage {
    fail_container: bool,
    failing_objects: HashSet<String>,
    failing_deletes: bool,
    upload_delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    state: Mutex<StorageState>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `create_container` call fails.
    pub fn failing_container(mut self) -> Self {
        self.fail_container = true;
        self
    }

    /// Uploads of `object_name` fail.
    pub fn failing_upload(mut self, object_name: &str) -> Self {
        self.failing_objects.insert(object_name.to_string());
        self
    }

    /// Every `delete_object` call fails.
    pub fn failing_deletes(mut self) -> Self {
        self.failing_deletes = true;
        self
    }

    /// Each upload sleeps this long before storing.
    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn containers(&self) -> BTreeMap<String, String> {
        self.state.lock().unwrap().containers.clone()
    }

    pub fn objects(&self) -> BTreeMap<String, StoredObject> {
        self.state.lock().unwrap().objects.clone()
    }

    pub fn upload_order(&self) -> Vec<String> {
        self.state.lock().unwrap().upload_order.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerStorage for MockStorage {
    async fn create_container(&self, name: &str) -> StorageResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if self.fail_container {
            return Err(StorageError::ContainerFailed("injected failure".to_string()));
        }
        let id = uuid::Uuid::new_v4().to_string();
        state.containers.insert(id.clone(), name.to_string());
        Ok(id)
    }

    async fn upload_object(
        &self,
        container_id: &str,
        object_name: &str,
        content_type: &str,
        _content_length: Option<u64>,
        mut reader: ObjectReader,
    ) -> StorageResult<String> {
        {
            let mut state = self.state.lock().unwrap();
            state.calls += 1;
            if !state.containers.contains_key(container_id) {
                return Err(StorageError::NotFound(container_id.to_string()));
            }
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let mut bytes = Vec::new();
        let read = reader.read_to_end(&mut bytes).await;
        if let Some(delay) = self.upload_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        read?;

        if self.failing_objects.contains(object_name) {
            return Err(StorageError::UploadFailed(format!(
                "injected failure for {}",
                object_name
            )));
        }

        let object_id = format!("{}/{}", container_id, object_name);
        let mut state = self.state.lock().unwrap();
        state.objects.insert(
            object_id.clone(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        state.upload_order.push(object_id.clone());
        Ok(object_id)
    }

    async fn delete_object(&self, object_id: &str) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if self.failing_deletes {
            return Err(StorageError::DeleteFailed("injected failure".to_string()));
        }
        state.objects.remove(object_id);
        state.deleted.push(object_id.to_string());
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Messenger that records every send and fails for chosen recipients.
#[derive(Default)]
pub struct MockMessenger {
    failing_recipients: HashSet<String>,
    sent: Mutex<Vec<(String, String)>>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, recipient: &str) -> Self {
        self.failing_recipients.insert(recipient.to_string());
        self
    }

    /// Successful sends as `(recipient, text)`, in order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send(&self, recipient: &str, text: &str) -> MessagingResult<()> {
        if self.failing_recipients.contains(recipient) {
            return Err(MessagingError::Rejected {
                recipient: recipient.to_string(),
                status: 503,
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), text.to_string()));
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

/// Ledger whose appends always fail.
pub struct FailingLedger;

#[async_trait]
impl LedgerStore for FailingLedger {
    async fn initialize(&self) -> LedgerResult<()> {
        Ok(())
    }

    async fn append(&self, _entry: &LedgerEntry) -> LedgerResult<()> {
        Err(LedgerError::Write {
            path: PathBuf::from("ledger.json"),
            source: std::io::Error::other("disk full"),
        })
    }

    async fn entries(&self) -> LedgerResult<Vec<LedgerEntry>> {
        Err(LedgerError::Read {
            path: PathBuf::from("ledger.json"),
            source: std::io::Error::other("disk gone"),
        })
    }
}
