//! Repair rules for model output
//!
//! Model output is coerced into the typed step shape here, shared by the
//! generator and the forker:
//!
//! - missing `beliefs` -> empty list
//! - missing `confidence` -> 1.0
//! - out-of-range `confidence` -> rejected or clamped per [`ConfidencePolicy`]
//! - `operation` outside the vocabulary -> `Reflect`
//! - missing text fields -> caller-supplied fallback
//!
//! JSON `null` counts as missing. A value of the wrong JSON type rejects the
//! enclosing item.

use serde_json::{Map, Value};
use simforge_core::{Belief, CognitionStep, Operation};

use crate::config::ConfidencePolicy;
use crate::outcome::RejectionReason;

pub(crate) type ParseResult<T> = std::result::Result<T, RejectionReason>;

/// Fallbacks for fields a step entry leaves out
#[derive(Debug, Clone, Copy)]
pub(crate) struct StepDefaults<'a> {
    pub goal: &'a str,
    pub operation: Operation,
    pub output: &'a str,
}

impl Default for StepDefaults<'_> {
    fn default() -> Self {
        Self {
            goal: "",
            operation: Operation::Reflect,
            output: "",
        }
    }
}

/// Decode one completion into a JSON value
pub(crate) fn decode_completion(raw: &str) -> ParseResult<Value> {
    serde_json::from_str(raw.trim()).map_err(|e| {
        tracing::error!("Failed to parse JSON response: {}", e);
        tracing::debug!("Raw response: {}", raw);
        RejectionReason::UndecodableJson(e.to_string())
    })
}

/// Look up a field, treating `null` as absent
pub(crate) fn field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

/// Read an optional text field
pub(crate) fn text_field(object: &Map<String, Value>, key: &str) -> ParseResult<Option<String>> {
    match field(object, key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(RejectionReason::UnexpectedShape(format!(
            "'{}' should be a string, got {}",
            key,
            json_kind(other)
        ))),
    }
}

/// Parse a belief list
pub(crate) fn parse_beliefs(
    value: Option<&Value>,
    policy: ConfidencePolicy,
) -> ParseResult<Vec<Belief>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    let Some(entries) = value.as_array() else {
        return Err(RejectionReason::UnexpectedShape(format!(
            "'beliefs' should be an array, got {}",
            json_kind(value)
        )));
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_belief(index, entry, policy))
        .collect()
}

fn parse_belief(index: usize, entry: &Value, policy: ConfidencePolicy) -> ParseResult<Belief> {
    let Some(object) = entry.as_object() else {
        return Err(RejectionReason::UnexpectedShape(format!(
            "belief {} should be an object, got {}",
            index,
            json_kind(entry)
        )));
    };

    let content = text_field(object, "content")?.unwrap_or_default();
    let source = text_field(object, "source")?;

    let confidence = match field(object, "confidence") {
        None => simforge_core::cognition::DEFAULT_CONFIDENCE,
        Some(value) => value.as_f64().ok_or_else(|| {
            RejectionReason::InvalidBelief(format!(
                "belief {} confidence should be a number, got {}",
                index,
                json_kind(value)
            ))
        })?,
    };

    let built = match policy {
        ConfidencePolicy::Reject => Belief::new(content, confidence),
        ConfidencePolicy::Clamp => Belief::clamped(content, confidence),
    };

    let belief = built
        .map_err(|e| RejectionReason::InvalidBelief(format!("belief {}: {}", index, e)))?;

    Ok(match source {
        Some(source) => belief.with_source(source),
        None => belief,
    })
}

/// Materialize one step entry with a fresh id and no parent
pub(crate) fn parse_step(
    entry: &Value,
    defaults: StepDefaults<'_>,
    policy: ConfidencePolicy,
) -> ParseResult<CognitionStep> {
    let Some(object) = entry.as_object() else {
        return Err(RejectionReason::UnexpectedShape(format!(
            "step should be an object, got {}",
            json_kind(entry)
        )));
    };

    let goal = text_field(object, "goal")?.unwrap_or_else(|| defaults.goal.to_string());
    let output = text_field(object, "output")?.unwrap_or_else(|| defaults.output.to_string());
    let beliefs = parse_beliefs(field(object, "beliefs"), policy)?;
    let operation = match field(object, "operation") {
        None => defaults.operation,
        present => Operation::repair_json(present),
    };

    Ok(CognitionStep::new(goal, beliefs, operation).with_output(output))
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
