// src/scheduler.rs
// Fixed-period driver for the pipeline. Runs are serialized by
// construction: one task, one job, the next tick waits for the current
// run. Triggers missed while a run overruns coalesce into a single
// catch-up run right after it finishes.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::MissedTickBehavior;

/// Unit of scheduled work. The monitor's job wraps
/// `IngestionPipeline::run_once` and logs the report.
#[async_trait]
pub trait Job: Send {
    async fn run(&mut self);
}

/// Ticks immediately, then every `period`. Never returns.
pub async fn run_every(period: Duration, job: &mut dyn Job) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut runs: u64 = 0;
    loop {
        ticker.tick().await;
        runs += 1;
        tracing::debug!(target: "scheduler", runs, "tick");
        job.run().await;
    }
}
