// src/notify/telegram.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{render_message, AlertDispatcher, AlertEvent};

/// Sends alerts through the Telegram Bot API (`sendMessage`, HTML parse
/// mode). Credentials are read once at startup; if either is missing the
/// dispatcher stays constructible but every dispatch short-circuits to
/// `false` without touching the network.
pub struct TelegramNotifier {
    token: Option<String>,
    chat_id: Option<String>,
    client: Client,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("TELEGRAM_BOT_TOKEN").ok(),
            std::env::var("TELEGRAM_CHAT_ID").ok(),
        )
    }

    pub fn new(token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            chat_id: chat_id.filter(|c| !c.is_empty()),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[async_trait]
impl AlertDispatcher for TelegramNotifier {
    async fn dispatch(&self, event: &AlertEvent) -> bool {
        let (Some(token), Some(chat_id)) = (&self.token, &self.chat_id) else {
            tracing::warn!("telegram disabled: bot token or chat id missing");
            return false;
        };

        let url = format!("https://api.telegram.org/bot{token}/sendMessage");
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": render_message(event),
            "parse_mode": "HTML",
        });

        match self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(url = %event.url, "telegram alert sent");
                true
            }
            Ok(resp) => {
                tracing::warn!(
                    status = %resp.status(),
                    url = %event.url,
                    "telegram alert rejected"
                );
                false
            }
            Err(e) => {
                tracing::warn!(error = ?e, url = %event.url, "telegram alert failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event() -> AlertEvent {
        AlertEvent {
            source: "paste".into(),
            url: "https://leaktest.example".into(),
            matched: vec!["password".into()],
            ts: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_credentials_short_circuit_to_false() {
        let n = TelegramNotifier::new(None, None);
        assert!(!n.dispatch(&event()).await);

        let n = TelegramNotifier::new(Some("tok".into()), None);
        assert!(!n.dispatch(&event()).await);

        let n = TelegramNotifier::new(None, Some("42".into()));
        assert!(!n.dispatch(&event()).await);
    }

    #[tokio::test]
    async fn empty_credentials_count_as_missing() {
        let n = TelegramNotifier::new(Some(String::new()), Some(String::new()));
        assert!(!n.dispatch(&event()).await);
    }
}
