//! Message delivery to guests and configured recipients.

#[cfg(feature = "messaging-http")]
mod http;
mod log;

use async_trait::async_trait;
use guestbox_core::{Config, MessagingBackend};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "messaging-http")]
pub use http::HttpMessenger;
pub use log::LogMessenger;

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Gateway rejected message for {recipient}: HTTP {status}")]
    Rejected { recipient: String, status: u16 },

    #[error("Failed to reach messaging gateway: {0}")]
    Transport(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Messaging configuration error: {0}")]
    Config(String),
}

pub type MessagingResult<T> = Result<T, MessagingError>;

/// Sends a text message to one recipient
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, recipient: &str, text: &str) -> MessagingResult<()>;

    /// Backend name, for logs
    fn backend_name(&self) -> &'static str;
}

/// Create a messenger based on configuration
pub fn create_messenger(config: &Config) -> MessagingResult<Arc<dyn Messenger>> {
    match config.messaging_backend() {
        MessagingBackend::Log => Ok(Arc::new(LogMessenger)),

        #[cfg(feature = "messaging-http")]
        MessagingBackend::Http => {
            let url = config.messaging_gateway_url().ok_or_else(|| {
                MessagingError::Config("MESSAGING_GATEWAY_URL not configured".to_string())
            })?;
            let messenger = HttpMessenger::new(
                url.to_string(),
                config.messaging_gateway_token().map(String::from),
                Duration::from_secs(config.external_call_timeout_secs()),
            )?;
            Ok(Arc::new(messenger))
        }

        #[cfg(not(feature = "messaging-http"))]
        MessagingBackend::Http => Err(MessagingError::Config(
            "HTTP messaging backend not available (messaging-http feature not enabled)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        Config::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn log_backend_by_default() {
        let messenger = create_messenger(&config(&[
            ("SUBJECT_RECIPIENT", "1"),
            ("ORGANIZER_RECIPIENT", "2"),
        ]))
        .unwrap();
        assert_eq!(messenger.backend_name(), "log");
    }

    #[cfg(feature = "messaging-http")]
    #[test]
    fn http_backend_from_config() {
        let messenger = create_messenger(&config(&[
            ("SUBJECT_RECIPIENT", "1"),
            ("ORGANIZER_RECIPIENT", "2"),
            ("MESSAGING_BACKEND", "http"),
            ("MESSAGING_GATEWAY_URL", "http://localhost:8080/send"),
        ]))
        .unwrap();
        assert_eq!(messenger.backend_name(), "http");
    }
}
