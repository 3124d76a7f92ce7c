// src/notify/webhook.rs
use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;

use super::{Alert, Notifier};

/// Posts alerts to a chat webhook as `{"text": ...}`. Without a webhook
/// URL the notifier stays constructed but silent, so call sites never
/// branch on whether alerting is configured.
pub struct WebhookNotifier {
    webhook_url: Option<String>,
    client: Client,
    max_retries: u8,
}

impl WebhookNotifier {
    pub fn new(client: Client, webhook_url: Option<String>) -> Self {
        Self {
            webhook_url,
            client,
            max_retries: 3,
        }
    }

    pub fn with_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("alert webhook disabled (no ALERT_WEBHOOK_URL)");
            return Ok(());
        };

        let text = format!(
            "*vacancy-monitor:* {}\n{}\n@ {}",
            alert.summary,
            alert.detail,
            alert.ts.to_rfc3339()
        );
        let body = serde_json::json!({ "text": text });

        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self.client.post(url).json(&body).send().await;
            match res {
                Ok(rsp) => {
                    if let Err(e) = rsp.error_for_status_ref() {
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1)))
                                .await;
                            continue;
                        }
                        return Err(anyhow!("alert webhook HTTP error: {e}"));
                    }
                    return Ok(());
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500u64 << (attempt - 1))).await;
                        continue;
                    }
                    return Err(anyhow!("alert webhook request failed: {e}"));
                }
            }
        }
    }
}
