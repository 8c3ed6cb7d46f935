//! The fixed operation vocabulary of a cognition step

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Action taken at a cognition step
///
/// Deserialization is lenient: any label outside the vocabulary becomes
/// [`Operation::Reflect`]. Use [`str::parse`] for strict parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Operation {
    #[default]
    Reflect,
    Act,
    Plan,
    Fork,
}

impl Operation {
    /// Every operation, in prompt order
    pub const ALL: [Operation; 4] = [
        Operation::Reflect,
        Operation::Act,
        Operation::Plan,
        Operation::Fork,
    ];

    /// The wire label of this operation
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Reflect => "Reflect",
            Operation::Act => "Act",
            Operation::Plan => "Plan",
            Operation::Fork => "Fork",
        }
    }

    /// Map a label onto the vocabulary, falling back to `Reflect`.
    ///
    /// Matching is exact and case-sensitive.
    pub fn repair(label: &str) -> Self {
        label.parse().unwrap_or_else(|_| {
            tracing::debug!("Repairing unknown operation '{}' to Reflect", label);
            Operation::Reflect
        })
    }

    /// Repair an arbitrary JSON value; non-strings become `Reflect`
    pub fn repair_json(value: Option<&serde_json::Value>) -> Self {
        value
            .and_then(serde_json::Value::as_str)
            .map(Self::repair)
            .unwrap_or_default()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| CoreError::UnknownOperation(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(Operation::repair(&label))
    }
}
