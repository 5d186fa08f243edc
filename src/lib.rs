//! Draftsmith - Multi-Stage AI Content Pipeline
//!
//! Turns a topic into publish-ready Markdown through three stages: a
//! generator (single-pass or section-by-section), a critique panel with a
//! bounded revision loop, and a deterministic publish gate (SEO metadata,
//! readability, slop detection, word bounds).
//!
//! ## Core Features
//!
//! - **Strategies**: `fast` (one call, one editor) or `thorough` (chunked
//!   draft, five-agent panel, revisions)
//! - **Per-invocation accounting**: token and cost ledger in fixed-point micros
//! - **Resilient calls**: per-call timeout, backoff retry, cancellation
//! - **Providers**: OpenAI-compatible chat completions and local Ollama
//!
//! ## Quick Start
//!
//! ```ignore
//! use draftsmith::{Config, GenerationRequest, PipelineFacade};
//!
//! let facade = PipelineFacade::from_config(&Config::default())?;
//! let outcome = facade
//!     .generate_and_publish(&GenerationRequest::new("Async Rust").with_target_words(1200))
//!     .await?;
//! if outcome.result.publish_ready {
//!     std::fs::write("post.md", &outcome.result.final_content)?;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: provider abstraction, retry, timeouts, usage ledger
//! - [`pipeline`]: planner, generators, reviewer, publisher, facade
//! - [`config`]: layered configuration
//! - [`types`]: requests, drafts, reviews, publish results, errors

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Aggregation, Config, ConfigLoader, Strategy};

// Error Types
pub use types::error::{DraftError, ErrorCategory, ProviderError, Result, ValidationError};

// Domain Types
pub use types::{
    Cost, GeneratedDraft, GenerationRequest, PublishResult, ReviewResult, SectionPlan,
    SectionSpec, Tone, WordBounds,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{
    ContentReview, PipelineEvent, PipelineFacade, PublishOutcome, ReviewOutcome, SectionPlanner,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    ModelProvider, ProviderConfig, ProviderKind, RetryPolicy, SharedProvider, TimeoutConfig,
    UsageSummary, create_provider,
};
