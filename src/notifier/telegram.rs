use crate::notifier::Notifier;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(25);
const MAX_ERROR_BODY: usize = 300;

/// Sends messages to one chat through the Telegram Bot API
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .context("Failed to create Telegram HTTP client")?;

        Ok(Self {
            client,
            api_base: API_BASE.to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    /// Point the client at another Bot API server
    #[cfg(test)]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let form = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text),
            ("disable_web_page_preview", "false"),
        ];

        // The URL carries the bot token; keep it out of error messages.
        let response = self
            .client
            .post(self.send_message_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Telegram request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            anyhow::bail!("Telegram send failed status={} body={}", status, body);
        }

        debug!("Telegram message delivered ({} chars)", text.chars().count());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_url() {
        let notifier = TelegramNotifier::new("123:abc", "42").unwrap();
        assert_eq!(
            notifier.send_message_url(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );

        let notifier = notifier.with_api_base("http://localhost:8081/");
        assert_eq!(
            notifier.send_message_url(),
            "http://localhost:8081/bot123:abc/sendMessage"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let notifier = TelegramNotifier::new("123:abc", "42")
            .unwrap()
            .with_api_base("http://127.0.0.1:9");
        let err = notifier.send("hello").await.unwrap_err();
        assert!(!format!("{:#}", err).contains("123:abc"));
    }
}
