//! Batch outcomes - accepted items plus the reasons others were dropped
//!
//! Malformed model output is dropped per item, not raised. Carrying the drops
//! explicitly lets callers tell "fewer than requested" from "total failure".

use serde::Serialize;
use std::fmt;

/// Why one item of a batch was dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RejectionReason {
    /// The completion text was not valid JSON
    UndecodableJson(String),
    /// Valid JSON, but not the expected top-level or entry shape
    UnexpectedShape(String),
    /// A belief could not be built (confidence out of range or wrong type)
    InvalidBelief(String),
    /// The backend call itself failed (isolated batches only)
    Transport(String),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::UndecodableJson(detail) => write!(f, "undecodable JSON: {}", detail),
            RejectionReason::UnexpectedShape(detail) => write!(f, "unexpected shape: {}", detail),
            RejectionReason::InvalidBelief(detail) => write!(f, "invalid belief: {}", detail),
            RejectionReason::Transport(detail) => write!(f, "transport fault: {}", detail),
        }
    }
}

/// A dropped item and the slot it came from
///
/// For generation the slot is the request index in issue order; for forking
/// it is the entry index within the model's array (or 0 when the whole
/// response was unusable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub slot: usize,
    pub reason: RejectionReason,
}

/// Items accepted from a batch, in slot order, plus every rejection
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome<T> {
    pub accepted: Vec<T>,
    pub rejected: Vec<Rejection>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, item: T) {
        self.accepted.push(item);
    }

    pub fn reject(&mut self, slot: usize, reason: RejectionReason) {
        tracing::warn!("Dropping item in slot {}: {}", slot, reason);
        self.rejected.push(Rejection { slot, reason });
    }

    /// Items considered, accepted or not
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Drop the rejection record and keep the accepted items
    pub fn into_accepted(self) -> Vec<T> {
        self.accepted
    }
}
