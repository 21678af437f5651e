//! Configuration module
//!
//! Configuration is read once at startup from environment variables (a `.env`
//! file is honoured) and validated before anything else is initialized.

use std::env;

use crate::backend_types::{MessagingBackend, StorageBackend};
use crate::models::NotificationRecipients;

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_UPLOAD_BYTES: usize = 500 * 1024 * 1024;
const UPLOAD_CONCURRENCY: usize = 1;
const EXTERNAL_CALL_TIMEOUT_SECS: u64 = 60;
const LEDGER_PATH: &str = "data/dados_convidados.json";
const STAGING_DIR: &str = "data/uploads";
const LOCAL_STORAGE_PATH: &str = "data/containers";

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub max_upload_bytes: usize,
}

/// Intake service configuration
#[derive(Clone, Debug)]
pub struct IntakeConfig {
    pub base: BaseConfig,
    // Ledger and staging
    pub ledger_path: String,
    pub staging_dir: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub local_storage_path: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    // Messaging configuration
    pub messaging_backend: MessagingBackend,
    pub messaging_gateway_url: Option<String>,
    pub messaging_gateway_token: Option<String>,
    pub subject_recipient: Option<String>,
    pub organizer_recipient: Option<String>,
    // Pipeline behavior
    pub upload_concurrency: usize,
    pub rollback_partial_uploads: bool,
    pub external_call_timeout_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<IntakeConfig>);

impl Config {
    fn as_intake(&self) -> &IntakeConfig {
        &self.0
    }

    /// Load from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = IntakeConfig::from_lookup(lookup)?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_intake().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_intake().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.as_intake().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_intake().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_intake().base.environment
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.as_intake().base.max_upload_bytes
    }

    pub fn ledger_path(&self) -> &str {
        &self.as_intake().ledger_path
    }

    pub fn staging_dir(&self) -> &str {
        &self.as_intake().staging_dir
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_intake().storage_backend
    }

    pub fn local_storage_path(&self) -> &str {
        &self.as_intake().local_storage_path
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_intake().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_intake().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_intake().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_intake().aws_region.as_deref()
    }

    pub fn messaging_backend(&self) -> MessagingBackend {
        self.as_intake().messaging_backend
    }

    pub fn messaging_gateway_url(&self) -> Option<&str> {
        self.as_intake().messaging_gateway_url.as_deref()
    }

    pub fn messaging_gateway_token(&self) -> Option<&str> {
        self.as_intake().messaging_gateway_token.as_deref()
    }

    /// Subject and organizer recipients. Present once `validate()` has passed.
    pub fn notification_recipients(&self) -> Option<NotificationRecipients> {
        let intake = self.as_intake();
        match (&intake.subject_recipient, &intake.organizer_recipient) {
            (Some(subject), Some(organizer)) => {
                Some(NotificationRecipients::new(subject.clone(), organizer.clone()))
            }
            _ => None,
        }
    }

    pub fn upload_concurrency(&self) -> usize {
        self.as_intake().upload_concurrency
    }

    pub fn rollback_partial_uploads(&self) -> bool {
        self.as_intake().rollback_partial_uploads
    }

    pub fn external_call_timeout_secs(&self) -> u64 {
        self.as_intake().external_call_timeout_secs
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v.to_lowercase())
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl IntakeConfig {
    fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let config = IntakeConfig {
            base: BaseConfig {
                server_port: var("SERVER_PORT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(SERVER_PORT),
                cors_origins: var("CORS_ORIGINS")
                    .unwrap_or_else(|| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
                max_upload_bytes: var("MAX_UPLOAD_BYTES")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(MAX_UPLOAD_BYTES),
            },
            ledger_path: var("LEDGER_PATH").unwrap_or_else(|| LEDGER_PATH.to_string()),
            staging_dir: var("STAGING_DIR").unwrap_or_else(|| STAGING_DIR.to_string()),
            storage_backend: var("STORAGE_BACKEND")
                .map(|s| s.parse::<StorageBackend>())
                .transpose()?
                .unwrap_or(StorageBackend::Local),
            local_storage_path: var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|| LOCAL_STORAGE_PATH.to_string()),
            s3_bucket: var("S3_BUCKET"),
            s3_region: var("S3_REGION"),
            s3_endpoint: var("S3_ENDPOINT"),
            aws_region: var("AWS_REGION"),
            messaging_backend: var("MESSAGING_BACKEND")
                .map(|s| s.parse::<MessagingBackend>())
                .transpose()?
                .unwrap_or(MessagingBackend::Log),
            messaging_gateway_url: var("MESSAGING_GATEWAY_URL"),
            messaging_gateway_token: var("MESSAGING_GATEWAY_TOKEN"),
            subject_recipient: var("SUBJECT_RECIPIENT"),
            organizer_recipient: var("ORGANIZER_RECIPIENT"),
            upload_concurrency: var("UPLOAD_CONCURRENCY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(UPLOAD_CONCURRENCY),
            rollback_partial_uploads: parse_bool(var("ROLLBACK_PARTIAL_UPLOADS"), false),
            external_call_timeout_secs: var("EXTERNAL_CALL_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(EXTERNAL_CALL_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.subject_recipient.is_none() || self.organizer_recipient.is_none() {
            return Err(anyhow::anyhow!(
                "SUBJECT_RECIPIENT and ORGANIZER_RECIPIENT must be set"
            ));
        }

        if self.upload_concurrency == 0 {
            return Err(anyhow::anyhow!("UPLOAD_CONCURRENCY must be at least 1"));
        }

        if self.external_call_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "EXTERNAL_CALL_TIMEOUT_SECS must be at least 1"
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {}
        }

        if self.messaging_backend == MessagingBackend::Http
            && self.messaging_gateway_url.is_none()
        {
            return Err(anyhow::anyhow!(
                "MESSAGING_GATEWAY_URL must be set when using the http messaging backend"
            ));
        }

        Ok(())
    }
}
