// src/dedup.rs
use std::collections::HashSet;

use crate::types::DedupKey;

/// Set of already-persisted message keys.
///
/// Reconstructed from the sheet's existing rows at startup, so a process
/// restart never re-records rows that are already there. Entries are only
/// added after the sink confirms the append.
#[derive(Debug, Default)]
pub struct DedupIndex {
    seen: HashSet<DedupKey>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I: IntoIterator<Item = DedupKey>>(entries: I) -> Self {
        Self {
            seen: entries.into_iter().collect(),
        }
    }

    pub fn contains(&self, key: &DedupKey) -> bool {
        self.seen.contains(key)
    }

    /// Idempotent: recording a known key is a no-op, not an error.
    pub fn record(&mut self, key: DedupKey) {
        self.seen.insert(key);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
