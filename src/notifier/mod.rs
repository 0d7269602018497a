pub mod messages;
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

pub use telegram::TelegramNotifier;

/// Outbound messaging channel. One call per message; the caller logs
/// failures and carries on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Used when no destination credentials are configured: messages are only
/// written to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        info!(text = %text, "Notification (sending disabled)");
        Ok(())
    }
}
