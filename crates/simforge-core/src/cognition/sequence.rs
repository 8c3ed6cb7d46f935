//! Cognition sequences - ordered reasoning traces

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CognitionStep;
use crate::types::{Metadata, Timestamp};

/// Title used when the model does not supply one
pub const UNTITLED_SEQUENCE: &str = "Untitled Sequence";

/// An ordered collection of steps representing one reasoning trace
///
/// The sequence owns its rows; generated rows have no identity outside it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CognitionSequence {
    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// When the sequence was created
    #[serde(default = "Utc::now")]
    pub created_at: Timestamp,

    /// When the sequence was last updated
    #[serde(default = "Utc::now")]
    pub updated_at: Timestamp,

    /// Short title of the trace
    pub title: String,

    /// Longer description, if any
    #[serde(default)]
    pub description: Option<String>,

    /// Steps, in order
    #[serde(default)]
    pub rows: Vec<CognitionStep>,

    /// Free-form scalar metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl CognitionSequence {
    /// Create an empty sequence
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            title: title.into(),
            description: None,
            rows: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the rows
    pub fn with_rows(mut self, rows: Vec<CognitionStep>) -> Self {
        self.rows = rows;
        self
    }

    /// Set the metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the sequence has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find a row by id
    pub fn row(&self, id: Uuid) -> Option<&CognitionStep> {
        self.rows.iter().find(|row| row.id == id)
    }
}
