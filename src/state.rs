// src/state.rs
// Checkpoint written after every run: cursors plus the cross-run retry
// ledger behind the give-up-and-skip policy for poisoned messages.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::cursor::CursorState;
use crate::types::DedupKey;

pub const DEFAULT_STATE_PATH: &str = "state/monitor_state.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitorState {
    #[serde(default)]
    pub cursors: CursorState,
    /// Failed-run count per "channel/message_id" key.
    #[serde(default)]
    pub retry_counts: BTreeMap<String, u32>,
}

impl MonitorState {
    pub fn failure_count(&self, key: &DedupKey) -> u32 {
        self.retry_counts.get(&key.to_string()).copied().unwrap_or(0)
    }

    /// Counts one more failed run for the key; returns the new count.
    pub fn note_failure(&mut self, key: &DedupKey) -> u32 {
        let slot = self.retry_counts.entry(key.to_string()).or_insert(0);
        *slot += 1;
        *slot
    }

    pub fn clear_failure(&mut self, key: &DedupKey) {
        self.retry_counts.remove(&key.to_string());
    }

    /// Drops ledger entries the cursor has moved past.
    pub fn prune_failures(&mut self, channel: &str, through_id: i64) {
        let prefix = format!("{channel}/");
        self.retry_counts.retain(|k, _| {
            match k.strip_prefix(&prefix).and_then(|id| id.parse::<i64>().ok()) {
                Some(id) => id > through_id,
                None => true,
            }
        });
    }
}

/// Missing file means first run; an unreadable one is logged and treated
/// the same, the dedup index still guards against double rows.
pub async fn load_state(path: &Path) -> MonitorState {
    match fs::read_to_string(path).await {
        Ok(s) => match serde_json::from_str(&s) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %path.display(), "state file unreadable, starting fresh: {e:#}");
                MonitorState::default()
            }
        },
        Err(_) => MonitorState::default(),
    }
}

/// Best-effort write; failures are logged and the next run rewrites it.
pub async fn save_state(path: &Path, state: &MonitorState) {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(dir).await {
                tracing::warn!("state dir: {e:#}");
            }
        }
    }
    let body = serde_json::to_vec_pretty(state).unwrap_or_default();
    if let Err(e) = fs::write(path, body).await {
        tracing::warn!("write state: {e:#}");
    }
}
