// src/metrics.rs
use metrics::describe_counter;
use once_cell::sync::OnceCell;

/// One-time metrics registration so series carry descriptions under
/// whichever recorder the host process installs.
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("monitor_runs_total", "Pipeline runs started.");
        describe_counter!(
            "monitor_messages_fetched_total",
            "Messages fetched across all channels."
        );
        describe_counter!(
            "monitor_matches_total",
            "Messages matching the keyword set."
        );
        describe_counter!("monitor_persisted_total", "Rows appended to the sheet.");
        describe_counter!(
            "monitor_duplicates_total",
            "Messages skipped as already persisted."
        );
        describe_counter!(
            "monitor_persist_failures_total",
            "Matched messages that failed persistence within a run."
        );
        describe_counter!("monitor_fetch_errors_total", "Channel fetches that failed.");
        describe_counter!(
            "monitor_poison_skips_total",
            "Messages skipped after exhausting cross-run retries."
        );
        describe_counter!("monitor_alerts_total", "Operator alerts delivered.");
    });
}
