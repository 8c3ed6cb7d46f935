//! Beliefs - weighted claims held at a cognition step
//!
//! A belief pairs a claim with a confidence weight in `[0.0, 1.0]` and an
//! optional attribution. Out-of-range confidence is rejected at construction,
//! including when a belief is deserialized.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Confidence assigned when none is given
pub const DEFAULT_CONFIDENCE: f64 = 1.0;

/// A belief held at a cognition step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BeliefRecord")]
pub struct Belief {
    /// The claim believed to be true
    pub content: String,

    /// Confidence in this belief (0.0-1.0)
    pub confidence: f64,

    /// Where the belief came from, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Belief {
    /// Create a new belief, rejecting confidence outside `[0.0, 1.0]`
    pub fn new(content: impl Into<String>, confidence: f64) -> Result<Self> {
        check_confidence(confidence)?;
        Ok(Self {
            content: content.into(),
            confidence,
            source: None,
        })
    }

    /// Create a belief held with full confidence
    pub fn certain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            confidence: DEFAULT_CONFIDENCE,
            source: None,
        }
    }

    /// Create a belief with confidence clamped into `[0.0, 1.0]`.
    ///
    /// NaN has no meaningful clamp and is still rejected.
    pub fn clamped(content: impl Into<String>, confidence: f64) -> Result<Self> {
        if confidence.is_nan() {
            return Err(CoreError::ConfidenceOutOfRange(confidence));
        }
        Self::new(content, confidence.clamp(0.0, 1.0))
    }

    /// Attribute the belief to a source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Re-check the confidence range on an already built belief
    pub fn check(&self) -> Result<()> {
        check_confidence(self.confidence)
    }
}

fn check_confidence(confidence: f64) -> Result<()> {
    if confidence.is_finite() && (0.0..=1.0).contains(&confidence) {
        Ok(())
    } else {
        Err(CoreError::ConfidenceOutOfRange(confidence))
    }
}

#[derive(Deserialize)]
struct BeliefRecord {
    content: String,
    #[serde(default = "default_confidence")]
    confidence: f64,
    #[serde(default)]
    source: Option<String>,
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

impl TryFrom<BeliefRecord> for Belief {
    type Error = CoreError;

    fn try_from(record: BeliefRecord) -> Result<Self> {
        let belief = Belief::new(record.content, record.confidence)?;
        Ok(match record.source {
            Some(source) => belief.with_source(source),
            None => belief,
        })
    }
}
