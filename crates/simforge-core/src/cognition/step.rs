//! Cognition steps - one atomic unit of reasoning

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Belief, Operation};
use crate::types::{Metadata, MetadataValue};

/// One step of a cognition trace: goal, beliefs, operation and output
///
/// A step produced by forking carries `parent_id` pointing at the step it was
/// derived from. The reference is lookup-only; nothing guarantees the parent
/// still exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CognitionStep {
    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// What the agent is trying to achieve at this step
    pub goal: String,

    /// Beliefs held at this step, in order
    #[serde(default)]
    pub beliefs: Vec<Belief>,

    /// Action taken
    pub operation: Operation,

    /// Result of the operation
    #[serde(default)]
    pub output: Option<String>,

    /// Step this one was forked from
    #[serde(default)]
    pub parent_id: Option<Uuid>,

    /// Free-form scalar metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl CognitionStep {
    /// Create a new step with a fresh id
    pub fn new(goal: impl Into<String>, beliefs: Vec<Belief>, operation: Operation) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal: goal.into(),
            beliefs,
            operation,
            output: None,
            parent_id: None,
            metadata: Metadata::new(),
        }
    }

    /// Set the output
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Link this step to the step it was derived from
    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether this step was produced by forking
    pub fn is_fork(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Output text, empty when absent
    pub fn output_text(&self) -> &str {
        self.output.as_deref().unwrap_or("")
    }
}
