//! Structured Output Parsing
//!
//! Turns free-form model text into typed values:
//! - JSON repair for malformed responses
//! - serde deserialization into the expected shape
//!
//! Fail on shape errors, repair on format issues.

mod json_repair;

pub use json_repair::{JsonRepairer, extract_json_from_response};

use serde::de::DeserializeOwned;

use crate::types::{DraftError, Result};

/// Parsed value plus whether repair was needed to get it
#[derive(Debug)]
pub struct StructuredOutput<T> {
    pub value: T,
    pub was_repaired: bool,
}

/// Parse a model response into `T`, repairing JSON formatting first.
///
/// `stage` names the pipeline stage in the error when the shape is wrong.
pub fn parse_structured<T: DeserializeOwned>(raw: &str, stage: &str) -> Result<StructuredOutput<T>> {
    let (value, was_repaired) = JsonRepairer::new().parse_or_repair(raw)?;

    let value = serde_json::from_value(value).map_err(|e| {
        DraftError::pipeline_recoverable(stage, format!("response has unexpected shape: {}", e))
    })?;

    Ok(StructuredOutput {
        value,
        was_repaired,
    })
}
