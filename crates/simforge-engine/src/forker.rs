//! Step Forker - alternative continuations of a single cognition step
//!
//! Three variation axes, each with its own system prompt:
//!
//! - `invert_beliefs`: challenge 1-2 beliefs and follow the consequences
//! - `change_goal`: keep beliefs mostly fixed, pursue a different goal
//! - `alternative_operation`: keep goal and beliefs, swap the operation
//!
//! One completion is requested per call; the model returns every variant in
//! a single array. Each fork gets a fresh id and points back at the original.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use simforge_core::{Belief, CognitionStep};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::backend::CompletionBackend;
use crate::config::{ConfidencePolicy, DEFAULT_FORK_TEMPERATURE};
use crate::error::{EngineError, Result};
use crate::outcome::{BatchOutcome, RejectionReason};
use crate::parse::{self, StepDefaults};

/// Most forks a single call may request
pub const MAX_FORKS: usize = 5;

/// Variation axis of a fork
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkType {
    InvertBeliefs,
    ChangeGoal,
    #[default]
    AlternativeOperation,
}

impl ForkType {
    pub const ALL: [ForkType; 3] = [
        ForkType::InvertBeliefs,
        ForkType::ChangeGoal,
        ForkType::AlternativeOperation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ForkType::InvertBeliefs => "invert_beliefs",
            ForkType::ChangeGoal => "change_goal",
            ForkType::AlternativeOperation => "alternative_operation",
        }
    }

    /// System prompt for this axis
    pub fn system_prompt(self) -> &'static str {
        match self {
            ForkType::InvertBeliefs => INVERT_BELIEFS_PROMPT,
            ForkType::ChangeGoal => CHANGE_GOAL_PROMPT,
            ForkType::AlternativeOperation => ALTERNATIVE_OPERATION_PROMPT,
        }
    }

    fn request_line(self) -> &'static str {
        match self {
            ForkType::InvertBeliefs => "by inverting or challenging some of the beliefs.",
            ForkType::ChangeGoal => "by changing the goal while keeping most beliefs similar.",
            ForkType::AlternativeOperation => {
                "by changing the operation while keeping the goal and beliefs the same. \
                 Choose from operations: Reflect, Act, Plan, Fork."
            }
        }
    }
}

impl fmt::Display for ForkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForkType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        ForkType::ALL
            .into_iter()
            .find(|fork_type| fork_type.as_str() == s)
            .ok_or_else(|| EngineError::UnsupportedForkType(s.to_string()))
    }
}

const INVERT_BELIEFS_PROMPT: &str = r#"You are SimForge, a synthetic cognition system. Create alternative versions of a cognitive step by inverting or challenging some of its beliefs.

For each alternative version:
1. Pick 1-2 key beliefs to invert or challenge
2. Adjust their confidence levels to match
3. Adjust the goal if the new beliefs call for it
4. Choose a new operation (Reflect, Act, Plan or Fork) that follows from the modified beliefs
5. Write a new output that reflects the operation

The versions must be coherent and plausible, and represent genuinely different perspectives.

RESPOND WITH A JSON OBJECT OF THIS SHAPE:
{
  "forks": [
    {
      "goal": "Goal adjusted to the inverted beliefs",
      "beliefs": [
        {"content": "Inverted belief 1", "confidence": 0.7},
        {"content": "Original belief 2", "confidence": 0.8}
      ],
      "operation": "Plan",
      "output": "New output based on the operation"
    }
  ]
}"#;

const CHANGE_GOAL_PROMPT: &str = r#"You are SimForge, a synthetic cognition system. Create alternative versions of a cognitive step by changing its goal while keeping most beliefs the same.

For each alternative version:
1. Set a new goal representing a different approach or priority
2. Keep most beliefs unchanged, adjusting at most 1-2 for coherence
3. Choose a new operation (Reflect, Act, Plan or Fork) that follows from the new goal
4. Write a new output that reflects the operation

The versions must be coherent and plausible, and represent genuinely different approaches to the situation.

RESPOND WITH A JSON OBJECT OF THIS SHAPE:
{
  "forks": [
    {
      "goal": "Alternative goal",
      "beliefs": [
        {"content": "Original belief 1", "confidence": 0.8},
        {"content": "Slightly modified belief 2", "confidence": 0.7}
      ],
      "operation": "Act",
      "output": "New output based on the operation"
    }
  ]
}"#;

const ALTERNATIVE_OPERATION_PROMPT: &str = r#"You are SimForge, a synthetic cognition system. Create alternative versions of a cognitive step by changing only its operation.

For each alternative version:
1. Keep the goal exactly the same
2. Keep the beliefs exactly the same
3. Use a different operation, one of: Reflect, Act, Plan, Fork
4. Write a new output that reflects the new operation

The versions must be coherent and plausible, and represent genuinely different approaches to the same goal and beliefs.

RESPOND WITH A JSON OBJECT OF THIS SHAPE:
{
  "forks": [
    {
      "goal": "Same goal as the original",
      "beliefs": [
        {"content": "Same belief 1", "confidence": 0.8},
        {"content": "Same belief 2", "confidence": 0.7}
      ],
      "operation": "Reflect",
      "output": "New output based on the alternative operation"
    }
  ]
}"#;

/// Produces forks of existing steps from a backend
#[derive(Debug, Clone)]
pub struct StepForker {
    backend: Arc<dyn CompletionBackend>,
    temperature: f64,
    confidence_policy: ConfidencePolicy,
}

impl StepForker {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            temperature: DEFAULT_FORK_TEMPERATURE,
            confidence_policy: ConfidencePolicy::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_confidence_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.confidence_policy = policy;
        self
    }

    pub fn backend(&self) -> &Arc<dyn CompletionBackend> {
        &self.backend
    }

    /// User prompt shared by every fork type; `context` is prepended when present
    pub fn build_user_prompt(
        step: &CognitionStep,
        num_forks: usize,
        fork_type: ForkType,
        context: Option<&str>,
    ) -> String {
        let prompt = format!(
            "Original cognitive step:\nGoal: {}\nBeliefs:\n{}\nOperation: {}\nOutput: {}\n\nCreate {} alternative versions {}",
            step.goal,
            format_beliefs(&step.beliefs),
            step.operation,
            step.output_text(),
            num_forks,
            fork_type.request_line()
        );

        match context.map(str::trim).filter(|c| !c.is_empty()) {
            Some(context) => format!("{}\n\n{}", context, prompt),
            None => prompt,
        }
    }

    /// Fork `step` into at most `num_forks` alternatives along `fork_type`.
    ///
    /// A response that is not a JSON array or an object with a `forks` array
    /// yields no forks (recorded as a slot-0 rejection). Extra entries past
    /// `num_forks` are ignored.
    pub async fn create_forks(
        &self,
        step: &CognitionStep,
        num_forks: usize,
        fork_type: ForkType,
        context: Option<&str>,
    ) -> Result<BatchOutcome<CognitionStep>> {
        if !(1..=MAX_FORKS).contains(&num_forks) {
            return Err(EngineError::InvalidArgument(format!(
                "num_forks must be between 1 and {}, got {}",
                MAX_FORKS, num_forks
            )));
        }

        tracing::info!("Creating {} forks of type {}", num_forks, fork_type);

        let user_prompt = Self::build_user_prompt(step, num_forks, fork_type, context);
        let raw = self
            .backend
            .complete(fork_type.system_prompt(), &user_prompt, self.temperature)
            .await
            .map_err(|e| {
                tracing::error!("Error generating forks with {}: {}", self.backend.provider(), e);
                e
            })?;

        let mut outcome = BatchOutcome::new();

        let value = match parse::decode_completion(&raw) {
            Ok(value) => value,
            Err(reason) => {
                outcome.reject(0, reason);
                return Ok(outcome);
            }
        };

        let entries = match fork_entries(&value) {
            Some(entries) => entries,
            None => {
                tracing::error!("Invalid fork data format");
                outcome.reject(
                    0,
                    RejectionReason::UnexpectedShape(format!(
                        "expected a fork array, got {}",
                        parse::json_kind(&value)
                    )),
                );
                return Ok(outcome);
            }
        };

        if entries.len() > num_forks {
            tracing::debug!(
                "Model returned {} forks, keeping the first {}",
                entries.len(),
                num_forks
            );
        }

        let defaults = StepDefaults {
            goal: &step.goal,
            operation: step.operation,
            output: "",
        };

        for (slot, entry) in entries.iter().take(num_forks).enumerate() {
            match parse::parse_step(entry, defaults, self.confidence_policy) {
                Ok(fork) => outcome.accept(pin_goal(fork, step, fork_type).with_parent(step.id)),
                Err(reason) => outcome.reject(slot, reason),
            }
        }

        Ok(outcome)
    }
}

/// An alternative operation never changes the goal; the original wins over the model
fn pin_goal(mut fork: CognitionStep, original: &CognitionStep, fork_type: ForkType) -> CognitionStep {
    if fork_type == ForkType::AlternativeOperation && fork.goal != original.goal {
        tracing::warn!(
            "Model changed the goal of an alternative_operation fork to {:?}; keeping {:?}",
            fork.goal,
            original.goal
        );
        fork.goal = original.goal.clone();
    }
    fork
}

fn fork_entries(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(entries) => Some(entries),
        Value::Object(object) => object.get("forks").and_then(Value::as_array),
        _ => None,
    }
}

fn format_beliefs(beliefs: &[Belief]) -> String {
    beliefs
        .iter()
        .map(|belief| format!("- {} (confidence: {})", belief.content, belief.confidence))
        .collect::<Vec<_>>()
        .join("\n")
}
