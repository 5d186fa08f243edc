//! Pipeline Facade
//!
//! Single entry point for the three workflows:
//!
//! ```text
//! generate             Generator
//! generate_and_review  Generator → Reviewer
//! generate_and_publish Generator → Reviewer → Publisher
//! ```
//!
//! The strategy is fixed when the facade is built, so one instance always has
//! the same cost profile. `quick_draft` is the exception: it always uses the
//! fast single-pass generator.
//!
//! Every call gets its own `RunContext` (usage ledger, cancellation token),
//! bounded by the configured deadline. Cancelling the caller's token, calling
//! `cancel_all`, or hitting the deadline drops in-flight provider calls and
//! returns an error; no partial result is ever returned. `cancel_all` only
//! affects invocations already running; the facade stays usable afterwards.

use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::context::RunContext;
use super::events::{EventBus, PipelineEvent};
use super::generator::{
    ChunkedGenerator, GeneratorSettings, SharedGenerator, SinglePassGenerator,
};
use super::publisher::Publisher;
use super::reviewer::{PanelReviewer, SharedReviewer, fast_panel, thorough_panel};
use super::sections::SectionPlanner;
use crate::ai::provider::{SharedProvider, create_provider};
use crate::ai::retry::RetryPolicy;
use crate::ai::timeout::{TimeoutConfig, cancellable, with_timeout};
use crate::ai::usage::UsageSummary;
use crate::config::{Config, ReviewSettings, Strategy};
use crate::types::{
    Cost, GeneratedDraft, GenerationRequest, PublishResult, Result, ReviewResult,
};

// =============================================================================
// Outcomes
// =============================================================================

/// Draft plus its review
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub draft: GeneratedDraft,
    pub review: ReviewResult,
    pub usage: UsageSummary,
}

/// Review of content supplied by the caller
#[derive(Debug, Clone, Serialize)]
pub struct ContentReview {
    pub review: ReviewResult,
    pub usage: UsageSummary,
}

/// Full pipeline output with totals for the whole invocation
#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub result: PublishResult,
    pub usage: UsageSummary,
    pub total_cost: Cost,
    pub elapsed_ms: u64,
}

// =============================================================================
// Strategy Lanes
// =============================================================================

/// Concrete stage implementations bound to one strategy
struct Lane {
    generator: SharedGenerator,
    reviewer: SharedReviewer,
    publisher: Publisher,
}

impl Lane {
    fn build(strategy: Strategy, provider: &SharedProvider, config: &Config) -> Self {
        let settings = GeneratorSettings::from_config(config);

        let (generator, reviewer): (SharedGenerator, SharedReviewer) = match strategy {
            Strategy::Fast => {
                // One editor, one round, no revisions
                let review = ReviewSettings {
                    max_iterations: 1,
                    auto_revise: false,
                    ..config.review.clone()
                };
                (
                    Arc::new(SinglePassGenerator::new(Arc::clone(provider), settings)),
                    Arc::new(PanelReviewer::new(
                        Arc::clone(provider),
                        fast_panel(),
                        review,
                        config.llm.max_output_tokens,
                    )),
                )
            }
            Strategy::Thorough => (
                Arc::new(ChunkedGenerator::new(
                    Arc::clone(provider),
                    SectionPlanner::with_overrides(&config.content_types),
                    settings,
                )),
                Arc::new(PanelReviewer::new(
                    Arc::clone(provider),
                    thorough_panel(),
                    config.review.clone(),
                    config.llm.max_output_tokens,
                )),
            ),
        };

        let publisher = Publisher::new(
            Arc::clone(&generator),
            Some(Arc::clone(&reviewer)),
            config.publish.clone(),
        )
        .with_content_bounds(&config.content_types);

        Self {
            generator,
            reviewer,
            publisher,
        }
    }
}

// =============================================================================
// Facade
// =============================================================================

pub struct PipelineFacade {
    strategy: Strategy,
    lane: Lane,
    /// Single-pass generator for `quick_draft`
    quick: SharedGenerator,
    timeouts: TimeoutConfig,
    retry: RetryPolicy,
    events: EventBus,
    provider: SharedProvider,
    /// Replaced on every `cancel_all`
    shutdown: RwLock<CancellationToken>,
}

impl PipelineFacade {
    /// Build with the strategy from `config.pipeline.strategy`
    pub fn new(provider: SharedProvider, config: &Config) -> Result<Self> {
        config.validate()?;

        let strategy = config.pipeline.strategy;
        let lane = Lane::build(strategy, &provider, config);
        let quick: SharedGenerator = Arc::new(SinglePassGenerator::new(
            Arc::clone(&provider),
            GeneratorSettings::from_config(config),
        ));

        info!(
            strategy = %strategy,
            provider = provider.name(),
            model = provider.model(),
            "Pipeline ready"
        );

        Ok(Self {
            strategy,
            lane,
            quick,
            timeouts: TimeoutConfig::new(
                Duration::from_secs(config.llm.timeout_secs),
                Duration::from_secs(config.pipeline.deadline_secs),
            ),
            retry: config.pipeline.retry.clone(),
            events: EventBus::new(),
            provider,
            shutdown: RwLock::new(CancellationToken::new()),
        })
    }

    /// Build the configured provider, then the facade
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = create_provider(&config.llm)?;
        Self::new(provider, config)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Progress events from every invocation of this facade
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    /// Cancel every in-flight invocation. Later calls run normally.
    pub fn cancel_all(&self) {
        let previous = {
            let mut shutdown = self
                .shutdown
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::replace(&mut *shutdown, CancellationToken::new())
        };
        previous.cancel();
        info!("Cancelled in-flight invocations");
    }

    fn shutdown_token(&self) -> CancellationToken {
        self.shutdown
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Ask the provider whether it is reachable and serving the configured model
    pub async fn check_provider(&self) -> Result<bool> {
        let healthy = with_timeout(
            self.timeouts.provider_call,
            self.provider.health_check(),
            "health_check",
        )
        .await?;
        info!(
            provider = self.provider.name(),
            model = self.provider.model(),
            healthy,
            "Provider checked"
        );
        Ok(healthy)
    }

    fn context(&self, cancel: &CancellationToken) -> RunContext {
        RunContext::new(cancel.child_token())
            .with_call_timeout(self.timeouts.provider_call)
            .with_retry(self.retry.clone())
            .with_events(self.events.clone())
    }

    /// Bound a workflow by the deadline and the facade-wide shutdown token
    async fn guard<T, F>(&self, operation: &str, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let deadline = self.timeouts.invocation;
        let shutdown = self.shutdown_token();
        cancellable(&shutdown, with_timeout(deadline, work, operation), operation).await
    }

    // -------------------------------------------------------------------------
    // Workflows
    // -------------------------------------------------------------------------

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedDraft> {
        self.generate_with(request, &CancellationToken::new()).await
    }

    #[instrument(skip_all, fields(topic = %request.topic, strategy = %self.strategy))]
    pub async fn generate_with(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedDraft> {
        request.validate()?;
        let ctx = self.context(cancel);
        self.guard("generate", self.lane.generator.generate(request, &ctx))
            .await
    }

    pub async fn generate_and_review(&self, request: &GenerationRequest) -> Result<ReviewOutcome> {
        self.generate_and_review_with(request, &CancellationToken::new())
            .await
    }

    #[instrument(skip_all, fields(topic = %request.topic, strategy = %self.strategy))]
    pub async fn generate_and_review_with(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<ReviewOutcome> {
        request.validate()?;
        let ctx = self.context(cancel);

        let work = async {
            let mut draft = self.lane.generator.generate(request, &ctx).await?;
            let review = self
                .lane
                .reviewer
                .review(&draft.content, request, &ctx)
                .await?;
            draft.metadata.quality_score = Some(review.final_score);
            Ok((draft, review))
        };
        let (draft, review) = self.guard("generate_and_review", work).await?;

        Ok(ReviewOutcome {
            draft,
            review,
            usage: ctx.ledger().summary(),
        })
    }

    pub async fn generate_and_publish(&self, request: &GenerationRequest) -> Result<PublishOutcome> {
        self.generate_and_publish_with(request, &CancellationToken::new())
            .await
    }

    #[instrument(skip_all, fields(topic = %request.topic, strategy = %self.strategy))]
    pub async fn generate_and_publish_with(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<PublishOutcome> {
        request.validate()?;
        let ctx = self.context(cancel);

        let result = self
            .guard("generate_and_publish", self.lane.publisher.publish(request, &ctx))
            .await?;

        let usage = ctx.ledger().summary();
        info!(
            invocation = %ctx.invocation_id(),
            publish_ready = result.publish_ready,
            cost = %usage.total_cost,
            elapsed_ms = usage.elapsed_ms,
            "Pipeline complete"
        );

        Ok(PublishOutcome {
            total_cost: usage.total_cost,
            elapsed_ms: usage.elapsed_ms,
            result,
            usage,
        })
    }

    /// Review caller-supplied content with this facade's reviewer
    #[instrument(skip_all, fields(topic = %request.topic, strategy = %self.strategy))]
    pub async fn review_content(
        &self,
        content: &str,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<ContentReview> {
        request.validate()?;
        let ctx = self.context(cancel);

        let review = self
            .guard("review", self.lane.reviewer.review(content, request, &ctx))
            .await?;

        Ok(ContentReview {
            review,
            usage: ctx.ledger().summary(),
        })
    }

    /// Single-pass draft regardless of the configured strategy
    pub async fn quick_draft(&self, request: &GenerationRequest) -> Result<GeneratedDraft> {
        self.quick_draft_with(request, &CancellationToken::new())
            .await
    }

    #[instrument(skip_all, fields(topic = %request.topic))]
    pub async fn quick_draft_with(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GeneratedDraft> {
        request.validate()?;
        let ctx = self.context(cancel);
        self.guard("quick_draft", self.quick.generate(request, &ctx))
            .await
    }
}
