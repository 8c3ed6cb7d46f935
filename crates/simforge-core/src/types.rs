//! Core types shared across the cognition model
//!
//! - Timestamps
//! - Scalar metadata values and maps

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Timestamp type alias
pub type Timestamp = DateTime<Utc>;

/// Metadata attached to steps and sequences: string keys, scalar values only
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A scalar metadata value
///
/// Variant order matters for the untagged representation: booleans and
/// integers must be tried before floats so `3` stays an integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl MetadataValue {
    /// Convert a JSON value into a scalar, or `None` for arrays, objects and null
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<usize> for MetadataValue {
    fn from(value: usize) -> Self {
        Self::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Collect the scalar entries of a JSON object into a metadata map.
///
/// Non-scalar entries are skipped; a non-object value yields an empty map.
pub fn metadata_from_json(value: &serde_json::Value) -> Metadata {
    let Some(object) = value.as_object() else {
        return Metadata::new();
    };

    object
        .iter()
        .filter_map(|(key, value)| {
            let scalar = MetadataValue::from_json(value);
            if scalar.is_none() {
                tracing::debug!("Skipping non-scalar metadata entry '{}'", key);
            }
            scalar.map(|v| (key.clone(), v))
        })
        .collect()
}
