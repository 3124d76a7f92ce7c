// src/fetch/gateway.rs
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;

use super::ChannelFetcher;
use crate::error::FetchError;
use crate::types::Message;

/// Page shape served by the message gateway.
#[derive(Debug, Deserialize)]
struct GatewayPage {
    messages: Vec<GatewayMessage>,
}

#[derive(Debug, Deserialize)]
struct GatewayMessage {
    id: i64,
    date: DateTime<Utc>,
    #[serde(default)]
    text: String,
}

enum Mode {
    /// Parse an embedded JSON page instead of calling out; used by tests.
    Fixture(&'static str),
    Http { base_url: String, token: String },
}

/// Pulls channel messages from the session gateway over HTTP. The session
/// token is opaque here; login state lives entirely in the gateway.
pub struct GatewayFetcher {
    mode: Mode,
    client: reqwest::Client,
}

impl GatewayFetcher {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            mode: Mode::Http {
                base_url: base_url.into(),
                token: token.into(),
            },
            client,
        }
    }

    pub fn from_fixture(json: &'static str) -> Self {
        Self {
            mode: Mode::Fixture(json),
            client: reqwest::Client::new(),
        }
    }

    async fn fetch_page(
        &self,
        channel: &str,
        after_id: Option<i64>,
        lookback_hours: u32,
    ) -> Result<GatewayPage, FetchError> {
        match &self.mode {
            Mode::Fixture(json) => serde_json::from_str(json)
                .map_err(|e| FetchError::Permanent(format!("fixture parse: {e}"))),
            Mode::Http { base_url, token } => {
                let url = format!(
                    "{}/channels/{}/messages",
                    base_url.trim_end_matches('/'),
                    channel
                );
                let mut req = self.client.get(&url).bearer_auth(token);
                req = match after_id {
                    Some(id) => req.query(&[("after_id", id.to_string())]),
                    None => req.query(&[("lookback_hours", lookback_hours.to_string())]),
                };
                let resp = req.send().await.map_err(classify_transport)?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(classify_status(status));
                }
                resp.json::<GatewayPage>()
                    .await
                    .map_err(|e| FetchError::Permanent(format!("gateway body: {e}")))
            }
        }
    }
}

fn classify_transport(e: reqwest::Error) -> FetchError {
    if e.is_timeout() || e.is_connect() {
        FetchError::Transient(format!("gateway request: {e}"))
    } else {
        FetchError::Permanent(format!("gateway request: {e}"))
    }
}

fn classify_status(status: reqwest::StatusCode) -> FetchError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        FetchError::Transient(format!("gateway status {status}"))
    } else {
        FetchError::Permanent(format!("gateway status {status}"))
    }
}

#[async_trait]
impl ChannelFetcher for GatewayFetcher {
    async fn fetch_since(
        &self,
        channel: &str,
        after_id: Option<i64>,
        lookback_hours: u32,
    ) -> Result<Vec<Message>, FetchError> {
        let page = self.fetch_page(channel, after_id, lookback_hours).await?;

        // Strictly-after-cursor, ascending; the page is not trusted on
        // either. Without a cursor the lookback window is the bound.
        let horizon = Utc::now() - ChronoDuration::hours(i64::from(lookback_hours));
        let mut out: Vec<Message> = page
            .messages
            .into_iter()
            .filter(|m| after_id.map_or(true, |c| m.id > c))
            .filter(|m| after_id.is_some() || m.date >= horizon)
            .map(|m| Message {
                channel: channel.to_string(),
                id: m.id,
                text: m.text,
                posted_at: m.date,
            })
            .collect();
        out.sort_by_key(|m| m.id);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "gateway"
    }
}
