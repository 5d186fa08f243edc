pub mod draft;
pub mod error;
pub mod publish;
pub mod request;
pub mod review;
pub mod section;
pub mod utils;

pub use draft::{DraftMetadata, GeneratedDraft, GenerationMode, SectionOutput, assemble_sections};
pub use error::{
    DraftError, ErrorCategory, ErrorClassifier, ProviderError, Result, ValidationError,
    ValidationErrorKind,
};
pub use publish::{PublishBlocker, PublishResult, SeoMetadata, SlopReport};
pub use request::{GenerationRequest, Tone, WordBounds};
pub use review::{AgentReview, QualityGateVerdict, ReviewResult, clamp_score};
pub use section::{SectionPlan, SectionSpec};
pub use utils::{capitalize_first, slugify, truncate_on_word_boundary, word_count};

// =============================================================================
// Domain Newtypes
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Monetary amount in integer micro-dollars (1 USD = 1_000_000).
///
/// Fixed-point so that sums across many calls never drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cost(u64);

impl Cost {
    pub const ZERO: Cost = Cost(0);

    pub fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Convert a floating USD amount, rounding to the nearest micro-dollar.
    /// Negative and non-finite inputs collapse to zero.
    pub fn from_usd(usd: f64) -> Self {
        if !usd.is_finite() || usd <= 0.0 {
            return Self::ZERO;
        }
        Self((usd * 1_000_000.0).round() as u64)
    }

    /// Price a call from token counts and per-million-token prices (USD)
    pub fn from_tokens(
        input_tokens: u32,
        output_tokens: u32,
        input_per_mtok: f64,
        output_per_mtok: f64,
    ) -> Self {
        // usd = tokens * price / 1e6, micros = usd * 1e6
        Self::from_usd(
            (input_tokens as f64 * input_per_mtok + output_tokens as f64 * output_per_mtok)
                / 1_000_000.0,
        )
    }

    pub fn micros(&self) -> u64 {
        self.0
    }

    pub fn as_usd(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        Cost(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Cost) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Cost>>(iter: I) -> Self {
        iter.fold(Cost::ZERO, Add::add)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.4}", self.as_usd())
    }
}

/// Identifier of one pipeline invocation, used in logs and usage summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(uuid::Uuid);

impl InvocationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
