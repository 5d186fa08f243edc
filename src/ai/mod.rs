//! Model Integration Layer
//!
//! Provider abstraction plus the call-level plumbing every stage shares:
//! timeouts, cancellation, retry and usage accounting.

pub mod provider;
pub mod retry;
pub mod timeout;
pub mod usage;
pub mod validation;

pub use provider::{
    Completion, CompletionRequest, ModelProvider, OllamaProvider, OpenAiProvider, ProviderConfig,
    ProviderKind, ResponseMetadata, ResponseTiming, SharedProvider, TokenUsage, create_provider,
};
pub use retry::RetryPolicy;
pub use timeout::{TimeoutConfig, cancellable, with_timeout};
pub use usage::{Stage, StageUsage, UsageLedger, UsageSummary};
pub use validation::{JsonRepairer, StructuredOutput, extract_json_from_response, parse_structured};
