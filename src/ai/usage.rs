//! Per-invocation Usage Accounting
//!
//! Every pipeline invocation owns exactly one `UsageLedger`. It is created by
//! the facade, passed down the call chain inside the run context, and never
//! shared between invocations. Counters are atomic so concurrently generated
//! sections and parallel critique agents can record without locking.
//!
//! ## Usage
//!
//! ```ignore
//! let ledger = UsageLedger::new(invocation_id);
//! ledger.record(Stage::Generation, &completion);
//! let summary = ledger.summary();
//! ```

use serde::Serialize;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

use crate::ai::provider::Completion;
use crate::types::{Cost, InvocationId};

/// Pipeline stage a provider call is billed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Generation,
    Review,
    Revision,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Generation, Stage::Review, Stage::Revision];

    fn index(self) -> usize {
        match self {
            Stage::Generation => 0,
            Stage::Review => 1,
            Stage::Revision => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Generation => "generation",
            Stage::Review => "review",
            Stage::Revision => "revision",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Default)]
struct StageCounters {
    calls: AtomicU32,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
    latency_ms: AtomicU64,
    cost_micros: AtomicU64,
}

impl StageCounters {
    fn snapshot(&self, stage: Stage) -> StageUsage {
        StageUsage {
            stage,
            calls: self.calls.load(Ordering::Relaxed),
            input_tokens: self.input_tokens.load(Ordering::Relaxed),
            output_tokens: self.output_tokens.load(Ordering::Relaxed),
            latency_ms: self.latency_ms.load(Ordering::Relaxed),
            cost: Cost::from_micros(self.cost_micros.load(Ordering::Relaxed)),
        }
    }
}

// =============================================================================
// Usage Ledger
// =============================================================================

/// Token and cost accumulator for one pipeline invocation
pub struct UsageLedger {
    invocation_id: InvocationId,
    start_time: Instant,
    stages: [StageCounters; 3],
}

/// Usage recorded for one stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageUsage {
    pub stage: Stage,
    pub calls: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub latency_ms: u64,
    pub cost: Cost,
}

/// Snapshot of everything recorded so far
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub invocation_id: InvocationId,
    pub elapsed_ms: u64,
    pub calls: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_cost: Cost,
    pub stages: Vec<StageUsage>,
}

impl UsageLedger {
    pub fn new(invocation_id: InvocationId) -> Self {
        Self {
            invocation_id,
            start_time: Instant::now(),
            stages: Default::default(),
        }
    }

    pub fn invocation_id(&self) -> InvocationId {
        self.invocation_id
    }

    /// Record a successful provider call against `stage`
    pub fn record(&self, stage: Stage, completion: &Completion) {
        let counters = &self.stages[stage.index()];
        counters.calls.fetch_add(1, Ordering::Relaxed);
        counters
            .input_tokens
            .fetch_add(completion.usage.input_tokens as u64, Ordering::Relaxed);
        counters
            .output_tokens
            .fetch_add(completion.usage.output_tokens as u64, Ordering::Relaxed);
        counters
            .latency_ms
            .fetch_add(completion.timing.total_ms, Ordering::Relaxed);
        counters
            .cost_micros
            .fetch_add(completion.cost.micros(), Ordering::Relaxed);
    }

    pub fn stage(&self, stage: Stage) -> StageUsage {
        self.stages[stage.index()].snapshot(stage)
    }

    pub fn total_cost(&self) -> Cost {
        Stage::ALL.iter().map(|s| self.stage(*s).cost).sum()
    }

    pub fn summary(&self) -> UsageSummary {
        let stages: Vec<StageUsage> = Stage::ALL.iter().map(|s| self.stage(*s)).collect();

        UsageSummary {
            invocation_id: self.invocation_id,
            elapsed_ms: self.start_time.elapsed().as_millis() as u64,
            calls: stages.iter().map(|s| s.calls).sum(),
            input_tokens: stages.iter().map(|s| s.input_tokens).sum(),
            output_tokens: stages.iter().map(|s| s.output_tokens).sum(),
            total_cost: stages.iter().map(|s| s.cost).sum(),
            stages,
        }
    }
}

impl UsageSummary {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Format summary for display
    pub fn display(&self) -> String {
        let mut out = format!(
            "Invocation: {}\n\
             Duration: {:.1}s\n\
             Provider Calls: {}\n\
             Tokens: {} (input: {}, output: {})\n\
             Cost: {}",
            self.invocation_id,
            self.elapsed_ms as f64 / 1000.0,
            self.calls,
            self.total_tokens(),
            self.input_tokens,
            self.output_tokens,
            self.total_cost
        );
        for stage in self.stages.iter().filter(|s| s.calls > 0) {
            out.push_str(&format!(
                "\n  {:<10} {} calls, {} tokens, {}",
                stage.stage,
                stage.calls,
                stage.input_tokens + stage.output_tokens,
                stage.cost
            ));
        }
        out
    }
}

// =============================================================================
// Tests
// =============================================================================
