// src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message pulled from a channel. Lives only within a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub channel: String,
    /// Monotonically increasing per channel, unique within it.
    pub id: i64,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

impl Message {
    /// Public link to the message, derived from channel + id.
    pub fn permalink(&self) -> String {
        format!("https://t.me/{}/{}", self.channel, self.id)
    }

    pub fn key(&self) -> DedupKey {
        DedupKey {
            channel: self.channel.clone(),
            message_id: self.id,
        }
    }
}

/// Identity of a message for dedup purposes. The same numeric id in two
/// different channels is two distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    pub channel: String,
    pub message_id: i64,
}

impl std::fmt::Display for DedupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.channel, self.message_id)
    }
}

/// Row appended to the sheet. Written at most once per DedupKey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacancyRecord {
    pub recorded_at: DateTime<Utc>,
    pub channel: String,
    pub message_id: i64,
    pub text: String,
    pub permalink: String,
}

impl VacancyRecord {
    pub fn from_message(msg: &Message, recorded_at: DateTime<Utc>) -> Self {
        Self {
            recorded_at,
            channel: msg.channel.clone(),
            message_id: msg.id,
            text: msg.text.clone(),
            permalink: msg.permalink(),
        }
    }

    pub fn key(&self) -> DedupKey {
        DedupKey {
            channel: self.channel.clone(),
            message_id: self.message_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn permalink_joins_channel_and_id() {
        let msg = Message {
            channel: "rabota_v_it".into(),
            id: 4182,
            text: "hiring".into(),
            posted_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        };
        assert_eq!(msg.permalink(), "https://t.me/rabota_v_it/4182");
    }

    #[test]
    fn same_id_different_channels_are_distinct_keys() {
        let a = DedupKey {
            channel: "a".into(),
            message_id: 7,
        };
        let b = DedupKey {
            channel: "b".into(),
            message_id: 7,
        };
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "a/7");
    }
}
