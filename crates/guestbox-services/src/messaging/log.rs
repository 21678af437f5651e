use async_trait::async_trait;

use super::{Messenger, MessagingResult};

/// Logs messages instead of delivering them. Always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMessenger;

#[async_trait]
impl Messenger for LogMessenger {
    async fn send(&self, recipient: &str, text: &str) -> MessagingResult<()> {
        tracing::info!(recipient = %recipient, text = %text, "Message (log backend)");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "log"
    }
}
