//! Sequence Generator - turns a free-text context into cognition sequences
//!
//! One system prompt is built per call (optionally carrying a caller schema),
//! `n` identical completion requests are issued concurrently, and each
//! response is parsed independently. Results keep request order.

use futures::future::join_all;
use serde_json::Value;
use simforge_core::cognition::UNTITLED_SEQUENCE;
use simforge_core::types::metadata_from_json;
use simforge_core::CognitionSequence;
use std::sync::Arc;

use crate::backend::CompletionBackend;
use crate::config::{BatchFaultPolicy, ConfidencePolicy};
use crate::error::{EngineError, Result};
use crate::outcome::{BatchOutcome, RejectionReason};
use crate::parse::{self, ParseResult, StepDefaults};

const BASE_SYSTEM_PROMPT: &str = r#"You are SimForge, a synthetic cognition system. Generate a sequence of cognitive steps showing how an agent would work through the problem it is given.

Every step provides:
1. A clear goal or objective
2. The beliefs held at that point, each with a confidence between 0 and 1
3. The operation taken, exactly one of: "Reflect", "Act", "Plan", "Fork"
4. The output or result of that operation

The sequence must be coherent and logical, and show a progression of thought that reaches a solution or conclusion.

CONSTRAINTS:
- Each step builds on previous steps
- Beliefs evolve as new information is discovered
- Operations are specific and actionable
- Outputs are concrete and informative

RESPOND WITH A SINGLE JSON OBJECT OF THIS SHAPE:
{
  "title": "Title of the sequence",
  "description": "Brief description of the sequence",
  "rows": [
    {
      "goal": "Goal for step 1",
      "beliefs": [
        {"content": "Belief 1", "confidence": 0.8},
        {"content": "Belief 2", "confidence": 0.6}
      ],
      "operation": "Reflect",
      "output": "Output of step 1"
    },
    {
      "goal": "Goal for step 2",
      "beliefs": [
        {"content": "Updated belief 1", "confidence": 0.9},
        {"content": "New belief based on step 1", "confidence": 0.7}
      ],
      "operation": "Plan",
      "output": "Output of step 2"
    }
  ]
}"#;

/// Generates cognition sequences from a backend
#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    backend: Arc<dyn CompletionBackend>,
    fault_policy: BatchFaultPolicy,
    confidence_policy: ConfidencePolicy,
}

impl SequenceGenerator {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            fault_policy: BatchFaultPolicy::default(),
            confidence_policy: ConfidencePolicy::default(),
        }
    }

    pub fn with_fault_policy(mut self, policy: BatchFaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    pub fn with_confidence_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.confidence_policy = policy;
        self
    }

    pub fn backend(&self) -> &Arc<dyn CompletionBackend> {
        &self.backend
    }

    /// Build the system prompt, appending the serialized schema when one is given.
    ///
    /// `null` and `{}` count as no schema.
    pub fn build_system_prompt(schema: Option<&Value>) -> String {
        let mut prompt = BASE_SYSTEM_PROMPT.to_string();

        let schema = schema.filter(|s| !s.is_null() && s.as_object().map_or(true, |o| !o.is_empty()));
        if let Some(schema) = schema {
            let rendered = serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
            prompt.push_str("\n\nUSE THIS SCHEMA FOR YOUR RESPONSE:\n");
            prompt.push_str(&rendered);
        }

        prompt
    }

    /// Generate `n` sequences for `context`.
    ///
    /// All `n` requests run concurrently and are awaited together. Undecodable
    /// or misshapen responses are dropped into `rejected`; a transport fault
    /// either fails the call or is recorded per slot, depending on the
    /// configured [`BatchFaultPolicy`].
    pub async fn generate(
        &self,
        context: &str,
        schema: Option<&Value>,
        n: usize,
        temperature: f64,
    ) -> Result<BatchOutcome<CognitionSequence>> {
        if n == 0 {
            return Err(EngineError::InvalidArgument(
                "n must be at least 1".to_string(),
            ));
        }
        if !temperature.is_finite() || temperature < 0.0 {
            return Err(EngineError::InvalidArgument(format!(
                "temperature must be a non-negative number, got {}",
                temperature
            )));
        }

        tracing::info!("Generating {} sequences with temperature {}", n, temperature);

        let system_prompt = Self::build_system_prompt(schema);
        let calls = (0..n).map(|_| self.backend.complete(&system_prompt, context, temperature));
        let responses = join_all(calls).await;

        let mut outcome = BatchOutcome::new();
        for (slot, response) in responses.into_iter().enumerate() {
            let raw = match response {
                Ok(raw) => raw,
                Err(e) => match self.fault_policy {
                    BatchFaultPolicy::FailFast => {
                        tracing::error!(
                            "Error generating with {}: slot {} failed: {}",
                            self.backend.provider(),
                            slot,
                            e
                        );
                        return Err(e);
                    }
                    BatchFaultPolicy::Isolate => {
                        outcome.reject(slot, RejectionReason::Transport(e.to_string()));
                        continue;
                    }
                },
            };

            match parse::decode_completion(&raw).and_then(|value| self.parse_sequence(&value)) {
                Ok(sequence) => outcome.accept(sequence),
                Err(reason) => outcome.reject(slot, reason),
            }
        }

        tracing::info!(
            "Generated {} of {} sequences",
            outcome.accepted.len(),
            n
        );
        Ok(outcome)
    }

    fn parse_sequence(&self, value: &Value) -> ParseResult<CognitionSequence> {
        let Some(object) = value.as_object() else {
            return Err(RejectionReason::UnexpectedShape(format!(
                "sequence should be an object, got {}",
                parse::json_kind(value)
            )));
        };

        let rows = match parse::field(object, "rows") {
            None => Vec::new(),
            Some(Value::Array(entries)) => entries
                .iter()
                .map(|entry| parse::parse_step(entry, StepDefaults::default(), self.confidence_policy))
                .collect::<ParseResult<Vec<_>>>()?,
            Some(other) => {
                return Err(RejectionReason::UnexpectedShape(format!(
                    "'rows' should be an array, got {}",
                    parse::json_kind(other)
                )))
            }
        };

        let title = parse::text_field(object, "title")?.unwrap_or_else(|| UNTITLED_SEQUENCE.to_string());
        let description = parse::text_field(object, "description")?;
        let metadata = parse::field(object, "metadata")
            .map(metadata_from_json)
            .unwrap_or_default();

        let mut sequence = CognitionSequence::new(title)
            .with_rows(rows)
            .with_metadata(metadata);
        sequence.description = description;
        Ok(sequence)
    }
}
