// src/notify/mod.rs
pub mod cooldown;
pub mod webhook;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Operator-facing trouble notice: an inaccessible channel, a message
/// skipped after repeated failed runs, that kind of thing.
#[derive(Debug, Clone)]
pub struct Alert {
    /// Stable key for cooldown grouping, e.g. "fetch/rabota_v_it" or a
    /// dedup key string.
    pub key: String,
    pub summary: String,
    pub detail: String,
    pub ts: DateTime<Utc>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &Alert) -> anyhow::Result<()>;
}
