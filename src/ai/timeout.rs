//! Timeouts and cancellation for async operations
//!
//! - `with_timeout` bounds one operation and maps expiry to `DraftError::Timeout`
//! - `cancellable` races an operation against a `CancellationToken`; the
//!   losing future is dropped, which aborts any in-flight HTTP request
//!
//! ## Usage
//!
//! ```ignore
//! use draftsmith::ai::timeout::{TimeoutConfig, with_timeout};
//!
//! let config = TimeoutConfig::default();
//! let text = with_timeout(config.provider_call, async { /* model call */ }, "section:Intro").await?;
//! ```

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::constants::network as net_constants;
use crate::types::{DraftError, Result};

/// Timeout settings for one pipeline invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Bound on a single provider call, per attempt
    pub provider_call: Duration,
    /// Bound on a whole workflow (generate, review and publish together)
    pub invocation: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            provider_call: Duration::from_secs(net_constants::DEFAULT_TIMEOUT_SECS),
            invocation: Duration::from_secs(net_constants::DEFAULT_DEADLINE_SECS),
        }
    }
}

impl TimeoutConfig {
    pub fn new(provider_call: Duration, invocation: Duration) -> Self {
        Self {
            provider_call,
            invocation,
        }
    }
}

/// Execute an async operation with a timeout
///
/// Returns `DraftError::Timeout` if the operation doesn't complete in time.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(DraftError::timeout(operation_name, timeout)),
    }
}

/// Execute an async operation unless `token` is cancelled first
///
/// Cancellation wins ties, so an already-cancelled token never starts work.
pub async fn cancellable<T, F>(token: &CancellationToken, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(DraftError::cancelled(operation_name)),
        result = future => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_config_defaults() {
        let config = TimeoutConfig::default();
        assert_eq!(config.provider_call.as_secs(), 120);
        assert!(config.invocation > config.provider_call);
    }

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, DraftError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, DraftError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), DraftError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_cancellable_stops_pending_work() {
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            child.cancel();
        });

        let result = cancellable(
            &token,
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, DraftError>(())
            },
            "long call",
        )
        .await;
        assert!(result.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_token_never_starts() {
        let token = CancellationToken::new();
        token.cancel();
        let result = cancellable(&token, async { Ok::<_, DraftError>(1) }, "call").await;
        assert!(result.is_err());
    }
}
