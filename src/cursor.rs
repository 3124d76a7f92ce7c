// src/cursor.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-channel watermark: the highest message id that has been fully
/// processed. Never moves backward; an absent entry means the channel has
/// no history yet and fetching falls back to the lookback window.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CursorState {
    cursors: BTreeMap<String, i64>,
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, channel: &str) -> Option<i64> {
        self.cursors.get(channel).copied()
    }

    /// Moves the channel's watermark forward. Backward moves are ignored,
    /// consistently, so callers cannot rewind a channel by accident.
    pub fn advance(&mut self, channel: &str, id: i64) {
        match self.cursors.get(channel) {
            Some(&current) if id <= current => {
                tracing::debug!(channel, current, rejected = id, "cursor advance ignored");
            }
            _ => {
                self.cursors.insert(channel.to_string(), id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }
}
