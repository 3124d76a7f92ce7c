// src/report.rs
use std::fmt;

/// Per-channel outcome counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelReport {
    pub fetched: usize,
    pub matched: usize,
    pub persisted: usize,
    pub skipped_duplicate: usize,
    pub failed: usize,
    /// Set when the channel's fetch itself failed; counts above stay 0.
    pub fetch_error: Option<String>,
}

/// What one pipeline run did, channel by channel, in processing order.
/// Rendered into the run log by the scheduler loop.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub channels: Vec<(String, ChannelReport)>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn channel(&self, name: &str) -> Option<&ChannelReport> {
        self.channels
            .iter()
            .find(|(c, _)| c == name)
            .map(|(_, r)| r)
    }

    pub fn total_fetched(&self) -> usize {
        self.channels.iter().map(|(_, r)| r.fetched).sum()
    }

    pub fn total_matched(&self) -> usize {
        self.channels.iter().map(|(_, r)| r.matched).sum()
    }

    pub fn total_persisted(&self) -> usize {
        self.channels.iter().map(|(_, r)| r.persisted).sum()
    }

    pub fn total_skipped_duplicate(&self) -> usize {
        self.channels.iter().map(|(_, r)| r.skipped_duplicate).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.channels.iter().map(|(_, r)| r.failed).sum()
    }

    /// True when every channel fetched cleanly and nothing failed.
    pub fn clean(&self) -> bool {
        self.total_failed() == 0 && self.channels.iter().all(|(_, r)| r.fetch_error.is_none())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Run Complete ({} ms) ===", self.duration_ms)?;
        writeln!(f, "Status:     {}", if self.clean() { "clean" } else { "degraded" })?;
        writeln!(f, "Fetched:    {}", self.total_fetched())?;
        writeln!(f, "Matched:    {}", self.total_matched())?;
        writeln!(f, "Persisted:  {}", self.total_persisted())?;
        writeln!(f, "Duplicates: {}", self.total_skipped_duplicate())?;
        writeln!(f, "Failed:     {}", self.total_failed())?;
        for (channel, r) in &self.channels {
            match &r.fetch_error {
                Some(err) => writeln!(f, "  {channel}: fetch failed ({err})")?,
                None => writeln!(
                    f,
                    "  {channel}: fetched {} matched {} persisted {} dup {} failed {}",
                    r.fetched, r.matched, r.persisted, r.skipped_duplicate, r.failed
                )?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunReport {
        RunReport {
            channels: vec![
                (
                    "a".to_string(),
                    ChannelReport {
                        fetched: 3,
                        matched: 2,
                        persisted: 1,
                        skipped_duplicate: 0,
                        failed: 1,
                        fetch_error: None,
                    },
                ),
                (
                    "b".to_string(),
                    ChannelReport {
                        fetch_error: Some("transient fetch failure: timeout".into()),
                        ..ChannelReport::default()
                    },
                ),
            ],
            duration_ms: 120,
        }
    }

    #[test]
    fn totals_sum_across_channels() {
        let r = sample();
        assert_eq!(r.total_fetched(), 3);
        assert_eq!(r.total_matched(), 2);
        assert_eq!(r.total_persisted(), 1);
        assert_eq!(r.total_failed(), 1);
        assert!(!r.clean());
    }

    #[test]
    fn lookup_by_channel_name() {
        let r = sample();
        assert_eq!(r.channel("a").unwrap().persisted, 1);
        assert!(r.channel("b").unwrap().fetch_error.is_some());
        assert!(r.channel("zzz").is_none());
    }

    #[test]
    fn display_mentions_each_channel() {
        let out = format!("{}", sample());
        assert!(out.contains("Run Complete"));
        assert!(out.contains("degraded"));
        assert!(out.contains("a: fetched 3"));
        assert!(out.contains("b: fetch failed"));
    }

    #[test]
    fn empty_run_is_clean() {
        let r = RunReport::default();
        assert!(r.clean());
        assert_eq!(r.total_persisted(), 0);
    }
}
