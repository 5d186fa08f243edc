//! Pipeline progress events
//!
//! Stages emit events on a `tokio::sync::broadcast` channel owned by the
//! facade. Sending never blocks and never fails the pipeline: with no
//! subscribers the event is dropped.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::ai::usage::Stage;
use crate::types::InvocationId;

const CHANNEL_CAPACITY: usize = 256;

/// Progress event for one invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    StageStarted {
        invocation: InvocationId,
        stage: Stage,
    },
    /// One section of a chunked draft finished
    SectionCompleted {
        invocation: InvocationId,
        index: usize,
        total: usize,
        title: String,
        words: usize,
    },
    /// One critique agent returned its verdict
    AgentReviewed {
        invocation: InvocationId,
        iteration: u32,
        agent: String,
        score: f32,
        passed: bool,
    },
    /// A review round ended below threshold and the draft was revised
    RevisionApplied {
        invocation: InvocationId,
        iteration: u32,
        score: f32,
        words: usize,
    },
    StageCompleted {
        invocation: InvocationId,
        stage: Stage,
        elapsed_ms: u64,
    },
}

/// Broadcast sender shared by every invocation of one facade
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PipelineEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: PipelineEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }
}
