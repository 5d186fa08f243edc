//! Retry policy for provider calls
//!
//! Exponential backoff with jitter via `backon`. Only recoverable errors
//! (rate limits, timeouts, transient network failures) are retried; auth and
//! bad-request failures surface immediately. A provider's `retry_after` hint
//! stretches the backoff delay, capped at `max_delay_secs`.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::retry as retry_constants;
use crate::types::{DraftError, Result};

/// Backoff settings for one provider call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 disables retrying)
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_delay_secs: u64,
    pub factor: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: retry_constants::DEFAULT_MAX_RETRIES,
            base_delay_ms: retry_constants::BASE_DELAY_MS,
            max_delay_secs: retry_constants::MAX_DELAY_SECS,
            factor: retry_constants::BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    /// Fail on the first error
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(self.base_delay_ms))
            .with_max_delay(Duration::from_secs(self.max_delay_secs))
            .with_factor(self.factor.max(1.0))
            .with_max_times(self.max_retries)
            .with_jitter()
    }

    /// Backoff delay stretched to the error's `retry_after` hint
    fn next_delay(&self, err: &DraftError, backoff: Duration) -> Duration {
        match err.retry_after() {
            Some(hint) => backoff.max(hint.min(Duration::from_secs(self.max_delay_secs))),
            None => backoff,
        }
    }

    /// Run `op` until it succeeds, fails with a non-recoverable error, or
    /// exhausts the retry budget. The last error is returned as-is.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.max_retries == 0 {
            return op().await;
        }

        op.retry(self.backoff())
            .when(DraftError::is_recoverable)
            .adjust(|err: &DraftError, delay: Option<Duration>| {
                delay.map(|delay| self.next_delay(err, delay))
            })
            .notify(|err: &DraftError, delay: Duration| {
                warn!(
                    operation,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Recoverable failure, retrying"
                );
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorCategory, ProviderError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy(retries: usize) -> RetryPolicy {
        RetryPolicy {
            max_retries: retries,
            base_delay_ms: 1,
            max_delay_secs: 1,
            factor: 1.0,
        }
    }

    #[tokio::test]
    async fn test_retries_recoverable_until_success() {
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let result = fast_policy(3)
            .run("test", move || async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(DraftError::provider(ErrorCategory::RateLimit, "429"))
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_recoverable_fails_immediately() {
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let result: Result<()> = fast_policy(3)
            .run("test", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(DraftError::provider(ErrorCategory::Auth, "401"))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_budget_exhausted_returns_last_error() {
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let result: Result<()> = fast_policy(2)
            .run("test", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(DraftError::provider(ErrorCategory::Network, "reset"))
            })
            .await;
        assert!(matches!(result, Err(DraftError::Provider(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_retry_after_stretches_delay() {
        let policy = fast_policy(2);
        let hinted = DraftError::Provider(
            ProviderError::new(ErrorCategory::RateLimit, "429")
                .retry_after(Duration::from_millis(300)),
        );
        let plain = DraftError::provider(ErrorCategory::Network, "reset");

        assert_eq!(
            policy.next_delay(&hinted, Duration::from_millis(5)),
            Duration::from_millis(300)
        );
        assert_eq!(
            policy.next_delay(&plain, Duration::from_millis(5)),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn test_retry_after_capped_by_max_delay() {
        let policy = fast_policy(2);
        let hinted = DraftError::Provider(
            ProviderError::new(ErrorCategory::RateLimit, "429").retry_after(Duration::from_secs(30)),
        );
        assert_eq!(
            policy.next_delay(&hinted, Duration::from_millis(5)),
            Duration::from_secs(1)
        );
    }

    #[tokio::test]
    async fn test_retry_waits_for_hint() {
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let started = std::time::Instant::now();
        let result = fast_policy(1)
            .run("test", move || async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(DraftError::Provider(
                        ProviderError::new(ErrorCategory::RateLimit, "429")
                            .retry_after(Duration::from_millis(80)),
                    ))
                } else {
                    Ok("done")
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert!(started.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_none_policy_single_attempt() {
        let counter = AtomicUsize::new(0);
        let attempts = &counter;
        let _: Result<()> = RetryPolicy::none()
            .run("test", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(DraftError::provider(ErrorCategory::Timeout, "slow"))
            })
            .await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
