//! Section plans for chunked generation.
//!
//! A `SectionPlan` is pure configuration: an ordered, immutable list of
//! sections with per-section word bounds and writing instructions.

use serde::{Deserialize, Serialize};

use super::error::{ValidationError, ValidationErrorKind};
use super::request::WordBounds;

/// One planned section of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    /// Heading rendered above the section
    pub title: String,
    /// What the model should write in this section
    pub instruction: String,
    pub min_words: u32,
    pub max_words: u32,
}

impl SectionSpec {
    pub fn new(
        title: impl Into<String>,
        instruction: impl Into<String>,
        min_words: u32,
        max_words: u32,
    ) -> Self {
        Self {
            title: title.into(),
            instruction: instruction.into(),
            min_words,
            max_words,
        }
    }

    pub fn bounds(&self) -> WordBounds {
        WordBounds::new(self.min_words, self.max_words)
    }

    /// Midpoint of the word bounds, used as the per-section target
    pub fn target_words(&self) -> u32 {
        ((u64::from(self.min_words) + u64::from(self.max_words)) / 2) as u32
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(
                ValidationError::new(ValidationErrorKind::MissingField, "section title is empty")
                    .with_field("sections.title"),
            );
        }
        if self.max_words == 0 || self.min_words > self.max_words {
            return Err(ValidationError::new(
                ValidationErrorKind::Range,
                format!(
                    "section '{}' has invalid word bounds {}..={}",
                    self.title, self.min_words, self.max_words
                ),
            )
            .with_field("sections.max_words")
            .with_comparison(
                "0 < min_words <= max_words",
                format!("{}..={}", self.min_words, self.max_words),
            ));
        }
        Ok(())
    }
}

/// Ordered list of sections forming one document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionPlan(Vec<SectionSpec>);

impl SectionPlan {
    pub fn new(sections: Vec<SectionSpec>) -> Self {
        Self(sections)
    }

    pub fn sections(&self) -> &[SectionSpec] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SectionSpec> {
        self.0.iter()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.0.iter().map(|s| s.title.as_str()).collect()
    }

    /// Sum of all section minimums and maximums, saturating at `u32::MAX`
    pub fn aggregate_bounds(&self) -> WordBounds {
        let min = self.0.iter().fold(0u32, |acc, s| acc.saturating_add(s.min_words));
        let max = self.0.iter().fold(0u32, |acc, s| acc.saturating_add(s.max_words));
        WordBounds::new(min, max)
    }

    /// Rescale every section so the plan's midpoint total matches `target_words`.
    ///
    /// Relative section weights are preserved; bounds never drop below one word.
    pub fn scaled_to(&self, target_words: u32) -> SectionPlan {
        let midpoint_total: u64 = self
            .0
            .iter()
            .map(|s| u64::from(s.target_words()))
            .sum();
        if midpoint_total == 0 || target_words == 0 || midpoint_total == u64::from(target_words) {
            return self.clone();
        }

        let factor = target_words as f64 / midpoint_total as f64;
        let scale = |words: u32| ((words as f64 * factor).round() as u32).max(1);

        SectionPlan(
            self.0
                .iter()
                .map(|s| SectionSpec {
                    title: s.title.clone(),
                    instruction: s.instruction.clone(),
                    min_words: scale(s.min_words),
                    max_words: scale(s.max_words).max(scale(s.min_words)),
                })
                .collect(),
        )
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::MissingField,
                "section plan must contain at least one section",
            )
            .with_field("sections"));
        }
        self.0.iter().try_for_each(SectionSpec::validate)
    }
}

impl<'a> IntoIterator for &'a SectionPlan {
    type Item = &'a SectionSpec;
    type IntoIter = std::slice::Iter<'a, SectionSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
