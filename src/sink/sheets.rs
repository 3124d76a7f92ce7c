// src/sink/sheets.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::PersistenceSink;
use crate::config::SheetSettings;
use crate::error::PersistError;
use crate::types::{DedupKey, VacancyRecord};

pub const HEADER_ROW: [&str; 5] = ["Date", "Channel", "Message ID", "Text", "Link"];

/// Spreadsheet REST adapter. Credentials stay opaque: the bearer token is
/// injected at construction and never inspected.
pub struct SheetsSink {
    client: reqwest::Client,
    settings: SheetSettings,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetsSink {
    pub fn new(client: reqwest::Client, settings: SheetSettings) -> Self {
        Self { client, settings }
    }

    fn range_url(&self) -> String {
        format!(
            "{}/{}/values/{}!A:E",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.spreadsheet_id,
            self.settings.tab
        )
    }

    async fn append_cells(&self, row: Vec<String>) -> Result<(), PersistError> {
        let url = format!("{}:append", self.range_url());
        let body = json!({ "values": [row] });
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }
        Ok(())
    }

    async fn read_rows(&self) -> Result<Vec<Vec<String>>, PersistError> {
        let resp = self
            .client
            .get(self.range_url())
            .bearer_auth(&self.settings.token)
            .send()
            .await
            .map_err(classify_transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(classify_status(status));
        }
        let range: ValueRange = resp
            .json()
            .await
            .map_err(|e| PersistError::Permanent(format!("sheet body: {e}")))?;
        Ok(range.values)
    }

    /// Appends the header row when the sheet is brand new; an existing
    /// first row that disagrees only gets a warning, data rows still land
    /// after it.
    pub async fn ensure_header(&self) -> Result<(), PersistError> {
        let rows = self.read_rows().await?;
        match rows.first() {
            None => {
                tracing::info!(sheet = %self.settings.tab, "empty sheet, writing header row");
                self.append_cells(HEADER_ROW.iter().map(|s| s.to_string()).collect())
                    .await
            }
            Some(first) if first.iter().map(String::as_str).ne(HEADER_ROW) => {
                tracing::warn!(sheet = %self.settings.tab, ?first, "unexpected header row");
                Ok(())
            }
            Some(_) => Ok(()),
        }
    }
}

#[async_trait]
impl PersistenceSink for SheetsSink {
    async fn append(&self, record: &VacancyRecord) -> Result<(), PersistError> {
        self.append_cells(record_row(record)).await
    }

    async fn list_existing(&self) -> Result<Vec<DedupKey>, PersistError> {
        Ok(keys_from_rows(&self.read_rows().await?))
    }

    async fn prepare(&self) -> Result<(), PersistError> {
        self.ensure_header().await
    }

    fn name(&self) -> &'static str {
        "sheets"
    }
}

fn record_row(record: &VacancyRecord) -> Vec<String> {
    vec![
        record.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        record.channel.clone(),
        record.message_id.to_string(),
        record.text.clone(),
        record.permalink.clone(),
    ]
}

/// Rows we wrote ourselves parse back; the header row and anything
/// hand-edited beyond recognition is skipped.
fn keys_from_rows(rows: &[Vec<String>]) -> Vec<DedupKey> {
    let mut keys = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let channel = row.get(1).map(String::as_str).unwrap_or("");
        let id = row.get(2).and_then(|v| v.trim().parse::<i64>().ok());
        match (channel, id) {
            ("", _) | (_, None) => {
                if row.iter().map(String::as_str).ne(HEADER_ROW) {
                    tracing::warn!(row = idx + 1, "skipping unparsable sheet row");
                }
            }
            (channel, Some(message_id)) => keys.push(DedupKey {
                channel: channel.to_string(),
                message_id,
            }),
        }
    }
    keys
}

fn classify_transport(e: reqwest::Error) -> PersistError {
    if e.is_timeout() || e.is_connect() {
        PersistError::Transient(format!("sheet request: {e}"))
    } else {
        PersistError::Permanent(format!("sheet request: {e}"))
    }
}

/// 429 and 5xx come back healthy after waiting; anything else needs an
/// operator (revoked token, deleted sheet).
fn classify_status(status: reqwest::StatusCode) -> PersistError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        PersistError::Transient(format!("sheet status {status}"))
    } else {
        PersistError::Permanent(format!("sheet status {status}"))
    }
}
