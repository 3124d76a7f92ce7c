// tests/sink_retry.rs
// Backoff behavior of append_with_retry, on tokio's paused clock so the
// exponential delays are observable without real waiting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use vacancy_monitor::config::RetryPolicy;
use vacancy_monitor::error::PersistError;
use vacancy_monitor::sink::{append_with_retry, PersistenceSink};
use vacancy_monitor::types::{DedupKey, VacancyRecord};

/// Fails the first `fail_first` appends; `permanent` picks the flavor.
struct FlakySink {
    fail_first: usize,
    permanent: bool,
    attempts: Arc<AtomicUsize>,
}

#[async_trait]
impl PersistenceSink for FlakySink {
    async fn append(&self, _record: &VacancyRecord) -> Result<(), PersistError> {
        let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.fail_first {
            return Err(if self.permanent {
                PersistError::Permanent("quota revoked".into())
            } else {
                PersistError::Transient("rate limited".into())
            });
        }
        Ok(())
    }

    async fn list_existing(&self) -> Result<Vec<DedupKey>, PersistError> {
        Ok(vec![])
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

fn record() -> VacancyRecord {
    VacancyRecord {
        recorded_at: Utc::now(),
        channel: "jobs".into(),
        message_id: 1,
        text: "hiring".into(),
        permalink: "https://t.me/jobs/1".into(),
    }
}

fn policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::from_millis(1000),
    }
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried_with_doubling_delays() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let sink = FlakySink {
        fail_first: 2,
        permanent: false,
        attempts: attempts.clone(),
    };

    let begin = tokio::time::Instant::now();
    append_with_retry(&sink, &record(), &policy()).await.unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    // 1s after the first failure, 2s after the second.
    assert_eq!(begin.elapsed(), Duration::from_millis(3000));
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_become_permanent_for_this_run() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let sink = FlakySink {
        fail_first: usize::MAX,
        permanent: false,
        attempts: attempts.clone(),
    };

    let err = append_with_retry(&sink, &record(), &policy())
        .await
        .unwrap_err();
    assert!(matches!(err, PersistError::Permanent(_)));
    assert!(err.to_string().contains("retries exhausted"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn permanent_failures_are_not_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let sink = FlakySink {
        fail_first: usize::MAX,
        permanent: true,
        attempts: attempts.clone(),
    };

    let begin = tokio::time::Instant::now();
    let err = append_with_retry(&sink, &record(), &policy())
        .await
        .unwrap_err();
    assert!(matches!(err, PersistError::Permanent(_)));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(begin.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn first_attempt_success_sleeps_not_at_all() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let sink = FlakySink {
        fail_first: 0,
        permanent: false,
        attempts: attempts.clone(),
    };

    let begin = tokio::time::Instant::now();
    append_with_retry(&sink, &record(), &policy()).await.unwrap();
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(begin.elapsed(), Duration::ZERO);
}
