use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use super::{Messenger, MessagingError, MessagingResult};

#[derive(Serialize)]
struct OutboundMessage<'a> {
    to: &'a str,
    text: &'a str,
}

/// Delivers messages through an HTTP gateway (e.g. a WhatsApp bridge)
///
/// Each message is a `POST {"to", "text"}` to `url`; any non-2xx answer is a
/// delivery failure.
pub struct HttpMessenger {
    http_client: Client,
    url: String,
    token: Option<String>,
}

impl Debug for HttpMessenger {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("HttpMessenger")
            .field("url", &self.url)
            .finish()
    }
}

impl HttpMessenger {
    pub fn new(url: String, token: Option<String>, timeout: Duration) -> MessagingResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MessagingError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            url,
            token,
        })
    }
}

#[async_trait]
impl Messenger for HttpMessenger {
    async fn send(&self, recipient: &str, text: &str) -> MessagingResult<()> {
        let start = std::time::Instant::now();
        let mut request = self.http_client.post(&self.url).json(&OutboundMessage {
            to: recipient,
            text,
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MessagingError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                recipient = %recipient,
                status = status.as_u16(),
                body = %error_text,
                "Messaging gateway rejected message"
            );
            return Err(MessagingError::Rejected {
                recipient: recipient.to_string(),
                status: status.as_u16(),
            });
        }

        tracing::debug!(
            recipient = %recipient,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Message delivered to gateway"
        );
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn posts_recipient_and_text_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/send")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::Json(json!({
                "to": "5511900000000",
                "text": "Obrigado!"
            })))
            .with_status(200)
            .create_async()
            .await;

        let messenger = HttpMessenger::new(
            format!("{}/send", server.url()),
            Some("secret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        messenger.send("5511900000000", "Obrigado!").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/send")
            .with_status(503)
            .with_body("gateway offline")
            .create_async()
            .await;

        let messenger =
            HttpMessenger::new(format!("{}/send", server.url()), None, Duration::from_secs(5))
                .unwrap();

        let err = messenger.send("1", "oi").await.unwrap_err();
        assert!(matches!(err, MessagingError::Rejected { status: 503, .. }));
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_transport_failure() {
        let messenger = HttpMessenger::new(
            "http://127.0.0.1:1/send".to_string(),
            None,
            Duration::from_secs(5),
        )
        .unwrap();

        let err = messenger.send("1", "oi").await.unwrap_err();
        assert!(matches!(err, MessagingError::Transport(_)));
    }
}
