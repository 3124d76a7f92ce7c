// src/notify/cooldown.rs
use std::collections::HashMap;

use chrono::{DateTime, Duration as ChronoDuration, Utc};

/// Per-key cooldown gate so hourly runs do not repeat the same alert.
/// - First alert for a key always passes.
/// - Inside the cooldown window the key is suppressed.
/// - State updates explicitly via `record` after a successful send.
#[derive(Debug, Clone, Default)]
pub struct AlertGate {
    cooldown: ChronoDuration,
    last_sent: HashMap<String, DateTime<Utc>>,
}

impl AlertGate {
    /// `cooldown_secs` < 0 is treated as 0 (gate always open).
    pub fn new(cooldown_secs: i64) -> Self {
        Self {
            cooldown: ChronoDuration::seconds(cooldown_secs.max(0)),
            last_sent: HashMap::new(),
        }
    }

    /// Check only; does NOT mutate state.
    pub fn should_send(&self, key: &str, now: DateTime<Utc>) -> bool {
        match self.last_sent.get(key) {
            None => true,
            Some(ts) => now.signed_duration_since(*ts) >= self.cooldown,
        }
    }

    pub fn record(&mut self, key: &str, now: DateTime<Utc>) {
        self.last_sent.insert(key.to_string(), now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn first_alert_passes() {
        let gate = AlertGate::new(10_800);
        let now = Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap();
        assert!(gate.should_send("fetch/jobs", now));
    }

    #[test]
    fn inside_cooldown_blocked() {
        let mut gate = AlertGate::new(10_800);
        let t0 = Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap();
        gate.record("fetch/jobs", t0);
        let t1 = t0 + ChronoDuration::seconds(3600);
        assert!(!gate.should_send("fetch/jobs", t1));
    }

    #[test]
    fn after_cooldown_passes() {
        let mut gate = AlertGate::new(10_800);
        let t0 = Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap();
        gate.record("fetch/jobs", t0);
        let t1 = t0 + ChronoDuration::seconds(10_800 + 5);
        assert!(gate.should_send("fetch/jobs", t1));
    }

    #[test]
    fn keys_cool_down_independently() {
        let mut gate = AlertGate::new(10_800);
        let t0 = Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap();
        gate.record("fetch/jobs", t0);
        assert!(!gate.should_send("fetch/jobs", t0));
        assert!(gate.should_send("jobs/4182", t0));
    }

    #[test]
    fn zero_cooldown_never_suppresses() {
        let mut gate = AlertGate::new(0);
        let t0 = Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap();
        gate.record("k", t0);
        assert!(gate.should_send("k", t0));
    }
}
