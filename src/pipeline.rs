// src/pipeline.rs
// The ingestion-filter-dedup-persist loop. Owns the dedup index and the
// cursors; adapters only report outcomes back.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use metrics::counter;

use crate::config::{AppConfig, RetryPolicy};
use crate::dedup::DedupIndex;
use crate::error::{BootstrapError, FetchError, PersistError};
use crate::fetch::ChannelFetcher;
use crate::matcher::KeywordMatcher;
use crate::metrics::ensure_metrics_described;
use crate::notify::cooldown::AlertGate;
use crate::notify::{Alert, Notifier};
use crate::report::{ChannelReport, RunReport};
use crate::sink::{append_with_retry, PersistenceSink};
use crate::state::{self, MonitorState};
use crate::types::{DedupKey, VacancyRecord};

/// Pipeline-facing knobs, split off AppConfig so adapter credentials stay
/// with the adapters.
#[derive(Debug, Clone)]
pub struct PipelineCfg {
    pub channels: Vec<String>,
    pub lookback_hours: u32,
    pub retry: RetryPolicy,
    pub skip_after_failures: u32,
    pub channel_pause: Duration,
    pub state_path: PathBuf,
    pub alert_cooldown_secs: i64,
}

impl PipelineCfg {
    pub fn from_app(cfg: &AppConfig) -> Self {
        Self {
            channels: cfg.channels.clone(),
            lookback_hours: cfg.lookback_hours,
            retry: cfg.retry,
            skip_after_failures: cfg.skip_after_failures,
            channel_pause: cfg.channel_pause,
            state_path: cfg.state_path.clone(),
            alert_cooldown_secs: cfg.alerts.cooldown_secs,
        }
    }
}

pub struct IngestionPipeline {
    fetcher: Box<dyn ChannelFetcher>,
    sink: Box<dyn PersistenceSink>,
    notifier: Box<dyn Notifier>,
    gate: AlertGate,
    matcher: KeywordMatcher,
    dedup: DedupIndex,
    state: MonitorState,
    cfg: PipelineCfg,
}

impl IngestionPipeline {
    pub fn new(
        fetcher: Box<dyn ChannelFetcher>,
        sink: Box<dyn PersistenceSink>,
        notifier: Box<dyn Notifier>,
        matcher: KeywordMatcher,
        cfg: PipelineCfg,
    ) -> Self {
        Self {
            fetcher,
            sink,
            notifier,
            gate: AlertGate::new(cfg.alert_cooldown_secs),
            matcher,
            dedup: DedupIndex::new(),
            state: MonitorState::default(),
            cfg,
        }
    }

    /// Loads the checkpoint, prepares the sink, and rebuilds the dedup
    /// index from the sheet's rows. A listing that cannot be read even
    /// after retries is fatal: an empty index over a non-empty sheet
    /// would duplicate every match. A listing that reads back empty is a
    /// genuine first run.
    pub async fn bootstrap(&mut self) -> Result<(), BootstrapError> {
        self.state = state::load_state(&self.cfg.state_path).await;
        if !self.state.cursors.is_empty() {
            tracing::info!(channels = self.state.cursors.len(), "checkpoint restored");
        }

        prepare_with_retry(self.sink.as_ref(), &self.cfg.retry)
            .await
            .map_err(|e| BootstrapError::SheetSetup(e.to_string()))?;

        let keys = list_with_retry(self.sink.as_ref(), &self.cfg.retry)
            .await
            .map_err(|e| BootstrapError::IndexReconstruction(e.to_string()))?;
        self.dedup = DedupIndex::from_entries(keys);
        tracing::info!(known = self.dedup.len(), "dedup index reconstructed");
        Ok(())
    }

    /// One full pass over every configured channel, in configured order.
    /// Per-channel trouble lands in the report; nothing short of a
    /// poisoned checkpoint write can abort a run.
    pub async fn run_once(&mut self) -> RunReport {
        ensure_metrics_described();
        counter!("monitor_runs_total").increment(1);
        let started = std::time::Instant::now();

        let mut report = RunReport::default();
        let channels = self.cfg.channels.clone();
        for (i, channel) in channels.iter().enumerate() {
            if i > 0 && !self.cfg.channel_pause.is_zero() {
                tokio::time::sleep(self.cfg.channel_pause).await;
            }
            let ch_report = self.process_channel(channel).await;
            report.channels.push((channel.clone(), ch_report));
        }

        state::save_state(&self.cfg.state_path, &self.state).await;
        report.duration_ms = started.elapsed().as_millis() as u64;
        report
    }

    async fn process_channel(&mut self, channel: &str) -> ChannelReport {
        let mut r = ChannelReport::default();
        let cursor = self.state.cursors.get(channel);

        let mut messages = match self
            .fetcher
            .fetch_since(channel, cursor, self.cfg.lookback_hours)
            .await
        {
            Ok(m) => m,
            Err(e) => {
                counter!("monitor_fetch_errors_total").increment(1);
                match &e {
                    FetchError::Transient(_) => {
                        tracing::warn!(channel, "fetch failed, will retry next run: {e}");
                    }
                    FetchError::Permanent(_) => {
                        tracing::error!(channel, "channel inaccessible: {e}");
                        self.alert(
                            format!("fetch/{channel}"),
                            format!("channel {channel} is inaccessible"),
                            e.to_string(),
                        )
                        .await;
                    }
                }
                r.fetch_error = Some(e.to_string());
                return r;
            }
        };

        // The fetcher contract already says ascending and strictly newer
        // than the cursor; enforce both here so cursor math stays local.
        messages.retain(|m| cursor.map_or(true, |c| m.id > c));
        messages.sort_by_key(|m| m.id);

        r.fetched = messages.len();
        counter!("monitor_messages_fetched_total").increment(messages.len() as u64);
        if messages.is_empty() {
            return r;
        }

        let mut processed_through = cursor;
        for msg in &messages {
            let key = msg.key();
            if self.dedup.contains(&key) {
                r.skipped_duplicate += 1;
                counter!("monitor_duplicates_total").increment(1);
                processed_through = Some(msg.id);
                continue;
            }
            if !self.matcher.matches(&msg.text) {
                processed_through = Some(msg.id);
                continue;
            }

            r.matched += 1;
            counter!("monitor_matches_total").increment(1);
            let record = VacancyRecord::from_message(msg, Utc::now());
            match append_with_retry(self.sink.as_ref(), &record, &self.cfg.retry).await {
                Ok(()) => {
                    self.dedup.record(key.clone());
                    self.state.clear_failure(&key);
                    r.persisted += 1;
                    counter!("monitor_persisted_total").increment(1);
                    processed_through = Some(msg.id);
                    tracing::info!(channel, id = msg.id, "vacancy recorded");
                }
                Err(e) => {
                    r.failed += 1;
                    counter!("monitor_persist_failures_total").increment(1);
                    let failed_runs = self.state.note_failure(&key);
                    if self.cfg.skip_after_failures > 0
                        && failed_runs >= self.cfg.skip_after_failures
                    {
                        counter!("monitor_poison_skips_total").increment(1);
                        tracing::error!(
                            channel,
                            id = msg.id,
                            failed_runs,
                            "giving up on message, skipping past it: {e}"
                        );
                        self.alert(
                            key.to_string(),
                            format!("skipped message {key} after {failed_runs} failed runs"),
                            e.to_string(),
                        )
                        .await;
                        self.state.clear_failure(&key);
                        processed_through = Some(msg.id);
                    } else {
                        tracing::warn!(
                            channel,
                            id = msg.id,
                            failed_runs,
                            "persist failed, message stays pending: {e}"
                        );
                        if failed_runs >= 2 {
                            self.alert(
                                key.to_string(),
                                format!("message {key} still failing after {failed_runs} runs"),
                                e.to_string(),
                            )
                            .await;
                        }
                        break;
                    }
                }
            }
        }

        if let Some(id) = processed_through {
            if Some(id) != cursor {
                self.state.cursors.advance(channel, id);
                self.state.prune_failures(channel, id);
            }
        }
        r
    }

    async fn alert(&mut self, key: String, summary: String, detail: String) {
        let now = Utc::now();
        if !self.gate.should_send(&key, now) {
            tracing::debug!(key, "alert suppressed by cooldown");
            return;
        }
        let alert = Alert {
            key: key.clone(),
            summary,
            detail,
            ts: now,
        };
        match self.notifier.send(&alert).await {
            Ok(()) => {
                counter!("monitor_alerts_total").increment(1);
                self.gate.record(&key, now);
            }
            Err(e) => tracing::warn!("alert delivery failed: {e:#}"),
        }
    }

    pub fn cursor(&self, channel: &str) -> Option<i64> {
        self.state.cursors.get(channel)
    }

    pub fn known_keys(&self) -> usize {
        self.dedup.len()
    }
}

async fn prepare_with_retry(
    sink: &dyn PersistenceSink,
    retry: &RetryPolicy,
) -> Result<(), PersistError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match sink.prepare().await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_transient() && attempt < retry.max_attempts => {
                tracing::warn!(attempt, "sheet preparation failed, backing off: {e}");
                tokio::time::sleep(retry.delay_for(attempt)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn list_with_retry(
    sink: &dyn PersistenceSink,
    retry: &RetryPolicy,
) -> Result<Vec<DedupKey>, PersistError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match sink.list_existing().await {
            Ok(keys) => return Ok(keys),
            Err(e) if e.is_transient() && attempt < retry.max_attempts => {
                tracing::warn!(attempt, "listing sheet rows failed, backing off: {e}");
                tokio::time::sleep(retry.delay_for(attempt)).await;
            }
            Err(e) => return Err(e),
        }
    }
}
