//! Content Pipeline
//!
//! ```text
//! GenerationRequest
//!   → SectionPlanner   (content type → section plan)
//!   → Generator        (single-pass or chunked draft)
//!   → Reviewer         (critique panel + bounded revision loop)
//!   → Publisher        (SEO, readability, slop scan, publish_ready)
//! ```
//!
//! `PipelineFacade` wires the stages for a `Strategy` and is the entry point
//! for callers.

pub mod context;
pub mod events;
pub mod facade;
pub mod generator;
pub mod publisher;
pub mod reviewer;
pub mod sections;

pub use context::RunContext;
pub use events::{EventBus, PipelineEvent};
pub use facade::{ContentReview, PipelineFacade, PublishOutcome, ReviewOutcome};
pub use generator::{
    ChunkedGenerator, Generator, GeneratorSettings, SharedGenerator, SinglePassGenerator,
};
pub use publisher::{Publisher, detect_slop, flesch_reading_ease};
pub use reviewer::{AgentDescriptor, PanelReviewer, Reviewer, SharedReviewer};
pub use sections::SectionPlanner;
