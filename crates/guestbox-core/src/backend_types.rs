use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Selects where submission containers are created. Defined in core because
/// configuration parses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// Messaging backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagingBackend {
    /// Messages are written to the log only (development)
    Log,
    /// Messages are POSTed to an HTTP messaging gateway
    Http,
}

impl FromStr for MessagingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "log" => Ok(MessagingBackend::Log),
            "http" => Ok(MessagingBackend::Http),
            _ => Err(anyhow::anyhow!("Invalid messaging backend: {}", s)),
        }
    }
}

impl Display for MessagingBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MessagingBackend::Log => write!(f, "log"),
            MessagingBackend::Http => write!(f, "http"),
        }
    }
}
