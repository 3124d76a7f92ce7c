// src/sink/mod.rs
pub mod sheets;

use async_trait::async_trait;

use crate::config::RetryPolicy;
use crate::error::PersistError;
use crate::types::{DedupKey, VacancyRecord};

/// Durable store for matched vacancies.
///
/// `append` is a single attempt; within-run retries live in
/// `append_with_retry`. `list_existing` feeds dedup bootstrap and must
/// return Ok only after actually reading the store, so an unreachable
/// store is never mistaken for an empty one.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn append(&self, record: &VacancyRecord) -> Result<(), PersistError>;

    async fn list_existing(&self) -> Result<Vec<DedupKey>, PersistError>;

    /// One-time store setup at bootstrap, before anything is appended.
    async fn prepare(&self) -> Result<(), PersistError> {
        Ok(())
    }

    fn name(&self) -> &'static str;
}

/// Retries transient append failures with exponential backoff, up to the
/// policy's attempt budget. Exhaustion is reported as permanent for this
/// run; the caller keeps the cursor behind the record so the next run
/// tries again.
///
/// A plain row append is not idempotent: when a success response is lost
/// in flight, that one attempt can land twice. The dedup index stops any
/// later duplicate, not that double write.
pub async fn append_with_retry<S: PersistenceSink + ?Sized>(
    sink: &S,
    record: &VacancyRecord,
    policy: &RetryPolicy,
) -> Result<(), PersistError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match sink.append(record).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                tracing::warn!(
                    sink = sink.name(),
                    attempt,
                    "transient persist failure, backing off: {e}"
                );
                tokio::time::sleep(policy.delay_for(attempt)).await;
            }
            Err(PersistError::Transient(msg)) => {
                return Err(PersistError::Permanent(format!(
                    "retries exhausted after {attempt} attempts: {msg}"
                )));
            }
            Err(e) => return Err(e),
        }
    }
}
