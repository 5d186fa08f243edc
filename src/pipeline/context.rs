//! Per-invocation run context
//!
//! A `RunContext` is created once per facade call and passed by reference
//! down the stage chain. It owns the invocation's usage ledger and
//! cancellation token, so concurrent invocations never share counters.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::events::{EventBus, PipelineEvent};
use crate::ai::provider::{Completion, CompletionRequest, ModelProvider};
use crate::ai::retry::RetryPolicy;
use crate::ai::timeout::{cancellable, with_timeout};
use crate::ai::usage::{Stage, UsageLedger};
use crate::constants::network::DEFAULT_TIMEOUT_SECS;
use crate::types::{InvocationId, Result};

pub struct RunContext {
    invocation_id: InvocationId,
    cancel: CancellationToken,
    call_timeout: Duration,
    retry: RetryPolicy,
    ledger: Arc<UsageLedger>,
    events: Option<EventBus>,
}

impl RunContext {
    pub fn new(cancel: CancellationToken) -> Self {
        let invocation_id = InvocationId::new();
        Self {
            invocation_id,
            cancel,
            call_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            ledger: Arc::new(UsageLedger::new(invocation_id)),
            events: None,
        }
    }

    /// Context with a fresh token, default timeout and no retries
    pub fn detached() -> Self {
        Self::new(CancellationToken::new()).with_retry(RetryPolicy::none())
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn invocation_id(&self) -> InvocationId {
        self.invocation_id
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn emit(&self, event: PipelineEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }

    /// Make one provider call on behalf of `stage`.
    ///
    /// Each attempt is bounded by the call timeout, recoverable failures are
    /// retried with backoff, and the whole sequence aborts as soon as the
    /// invocation is cancelled. Only successful calls reach the ledger.
    pub async fn complete(
        &self,
        provider: &dyn ModelProvider,
        request: &CompletionRequest,
        stage: Stage,
    ) -> Result<Completion> {
        let operation = request.label.as_str();
        let timeout = self.call_timeout;

        let attempts = self.retry.run(operation, move || {
            with_timeout(timeout, provider.complete(request), operation)
        });
        let completion = cancellable(&self.cancel, attempts, operation).await?;

        debug!(
            invocation = %self.invocation_id,
            stage = %stage,
            label = operation,
            tokens = completion.usage.total(),
            cost = %completion.cost,
            "Provider call recorded"
        );
        self.ledger.record(stage, &completion);
        Ok(completion)
    }
}
