//! Validator - post-construction gate for steps, sequences and ad hoc JSON
//!
//! Two independent checks live here:
//!
//! 1. **Structural re-validation** of built [`CognitionStep`]s and
//!    [`CognitionSequence`]s. Parsing already repaired what it could; this
//!    gate catches values mutated after construction. Failing items are
//!    reported, never repaired.
//! 2. **Shallow JSON-schema checking** of arbitrary payloads against
//!    `required` and `properties.<field>.type` only. No nesting, no formats.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use crate::cognition::{CognitionSequence, CognitionStep};

/// A structural problem found on a built step or sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// An id was the nil UUID
    NilId { owner: String },

    /// A belief confidence was non-finite or outside `[0.0, 1.0]`
    ConfidenceOutOfRange {
        step_id: Uuid,
        belief_index: usize,
        confidence: f64,
    },

    /// A step names itself as its parent
    SelfParent { step_id: Uuid },

    /// Two rows of one sequence share an id
    DuplicateRowId { step_id: Uuid },

    /// `updated_at` precedes `created_at`
    TimestampsOutOfOrder { sequence_id: Uuid },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NilId { owner } => write!(f, "{} has a nil id", owner),
            Violation::ConfidenceOutOfRange {
                step_id,
                belief_index,
                confidence,
            } => write!(
                f,
                "step {} belief {} has confidence {} outside [0.0, 1.0]",
                step_id, belief_index, confidence
            ),
            Violation::SelfParent { step_id } => write!(f, "step {} is its own parent", step_id),
            Violation::DuplicateRowId { step_id } => {
                write!(f, "row id {} appears more than once", step_id)
            }
            Violation::TimestampsOutOfOrder { sequence_id } => {
                write!(f, "sequence {} was updated before it was created", sequence_id)
            }
        }
    }
}

/// Result of the shallow JSON-schema check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaCheck {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Stateless validator
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// List every structural violation of a step
    pub fn check_step(&self, step: &CognitionStep) -> Vec<Violation> {
        let mut violations = Vec::new();

        if step.id.is_nil() {
            violations.push(Violation::NilId {
                owner: "step".to_string(),
            });
        }

        if step.parent_id == Some(step.id) {
            violations.push(Violation::SelfParent { step_id: step.id });
        }

        for (belief_index, belief) in step.beliefs.iter().enumerate() {
            if belief.check().is_err() {
                violations.push(Violation::ConfidenceOutOfRange {
                    step_id: step.id,
                    belief_index,
                    confidence: belief.confidence,
                });
            }
        }

        // `operation` membership is carried by the `Operation` type itself.
        violations
    }

    /// List every structural violation of a sequence and its rows
    pub fn check_sequence(&self, sequence: &CognitionSequence) -> Vec<Violation> {
        let mut violations = Vec::new();

        if sequence.id.is_nil() {
            violations.push(Violation::NilId {
                owner: "sequence".to_string(),
            });
        }

        if sequence.updated_at < sequence.created_at {
            violations.push(Violation::TimestampsOutOfOrder {
                sequence_id: sequence.id,
            });
        }

        let mut seen = HashSet::new();
        for row in &sequence.rows {
            if !seen.insert(row.id) {
                violations.push(Violation::DuplicateRowId { step_id: row.id });
            }
            violations.extend(self.check_step(row));
        }

        violations
    }

    /// Pass/fail structural check of a step
    pub fn validate_step(&self, step: &CognitionStep) -> bool {
        let violations = self.check_step(step);
        for violation in &violations {
            tracing::error!("Validation error: {}", violation);
        }
        violations.is_empty()
    }

    /// Pass/fail structural check of a sequence
    pub fn validate_sequence(&self, sequence: &CognitionSequence) -> bool {
        let violations = self.check_sequence(sequence);
        for violation in &violations {
            tracing::error!("Validation error in '{}': {}", sequence.title, violation);
        }
        violations.is_empty()
    }

    /// Check `data` against a minimal schema of `required` fields and
    /// `properties.<field>.type` declarations.
    ///
    /// Supported types are string, number, integer, array and object; any
    /// other or absent declaration passes. Non-string entries in `required`
    /// are ignored. When `data` is not an object every required field is
    /// missing and no property is checked.
    pub fn validate_json_against_schema(&self, data: &Value, schema: &Value) -> SchemaCheck {
        let mut errors = Vec::new();
        let fields = data.as_object();

        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for field in required.iter().filter_map(Value::as_str) {
            if !fields.is_some_and(|f| f.contains_key(field)) {
                errors.push(format!("Missing required field: {}", field));
            }
        }

        let properties = schema.get("properties").and_then(Value::as_object);

        if let (Some(properties), Some(fields)) = (properties, fields) {
            for (field, field_schema) in properties {
                let Some(value) = fields.get(field) else {
                    continue;
                };
                let declared = field_schema.get("type").and_then(Value::as_str);
                if let Some(message) = declared.and_then(|t| type_mismatch(field, t, value)) {
                    errors.push(message);
                }
            }
        }

        SchemaCheck {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

fn type_mismatch(field: &str, declared: &str, value: &Value) -> Option<String> {
    let (matches, noun) = match declared {
        "string" => (value.is_string(), "a string"),
        "number" => (value.is_number(), "a number"),
        "integer" => (value.is_i64() || value.is_u64(), "an integer"),
        "array" => (value.is_array(), "an array"),
        "object" => (value.is_object(), "an object"),
        _ => return None,
    };

    (!matches).then(|| format!("Field {} should be {}", field, noun))
}
