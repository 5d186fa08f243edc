//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Generation request defaults
pub mod request {
    /// Target word count when the caller does not provide one
    pub const DEFAULT_TARGET_WORDS: u32 = 800;

    /// Content type used when the key is missing or unknown
    pub const DEFAULT_CONTENT_TYPE: &str = "article";

    /// Category used when the caller does not provide one
    pub const DEFAULT_CATEGORY: &str = "general";
}

/// Generation stage constants
pub mod generation {
    /// Sampling temperature for draft writing
    pub const TEMPERATURE: f32 = 0.7;

    /// Output tokens budgeted per requested word
    pub const TOKENS_PER_WORD: f32 = 1.6;

    /// Extra output tokens for headings and formatting
    pub const TOKEN_HEADROOM: u32 = 256;

    /// Aggregate tolerance for chunked section bounds (fraction of the plan bounds)
    pub const SECTION_BOUNDS_TOLERANCE: f32 = 0.25;

    /// Separator placed between rendered sections in chunked drafts
    pub const SECTION_SEPARATOR: &str = "\n\n";

    /// Default number of sections generated concurrently
    pub const DEFAULT_SECTION_CONCURRENCY: usize = 1;
}

/// Review stage constants
pub mod review {
    /// Minimum aggregate score for approval
    pub const DEFAULT_MIN_SCORE: f32 = 7.0;

    /// Maximum review iterations (review rounds, including the first)
    pub const DEFAULT_MAX_ITERATIONS: usize = 3;

    /// Hard ceiling on configurable iterations
    pub const MAX_ITERATIONS_CEILING: usize = 10;

    /// Lowest score an agent can award
    pub const SCORE_FLOOR: f32 = 1.0;

    /// Highest score an agent can award
    pub const SCORE_CEILING: f32 = 10.0;

    /// Sampling temperature for critique agents
    pub const AGENT_TEMPERATURE: f32 = 0.2;

    /// Output token budget for one critique
    pub const AGENT_MAX_TOKENS: u32 = 1024;

    /// Sampling temperature for revisions
    pub const REVISION_TEMPERATURE: f32 = 0.5;
}

/// Publish stage constants
pub mod publish {
    /// Minimum slop-detection quality score (0-100) for publishing
    pub const DEFAULT_MIN_SLOP_QUALITY: f32 = 70.0;

    /// Accepted deviation from the target word count (fraction)
    pub const DEFAULT_WORD_TOLERANCE: f32 = 0.4;

    /// Maximum SEO title length in characters
    pub const MAX_TITLE_CHARS: usize = 60;

    /// Maximum SEO description length in characters
    pub const MAX_DESCRIPTION_CHARS: usize = 160;

    /// Maximum slug length in characters
    pub const MAX_SLUG_CHARS: usize = 80;
}

/// Retry constants for provider calls
pub mod retry {
    /// Retries after the first attempt
    pub const DEFAULT_MAX_RETRIES: usize = 2;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;

    /// Backoff multiplier
    pub const BACKOFF_FACTOR: f32 = 2.0;
}

/// HTTP/Network constants
pub mod network {
    /// Default per-call timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Default deadline for a whole pipeline invocation (seconds)
    pub const DEFAULT_DEADLINE_SECS: u64 = 1800;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}
