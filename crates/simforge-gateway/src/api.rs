//! Request and response bodies of the HTTP surface

use serde::{Deserialize, Serialize};
use serde_json::Value;
use simforge_core::{CognitionSequence, CognitionStep, Uuid};
use simforge_engine::{ForkType, Rejection, MAX_FORKS};

use crate::error::{GatewayError, Result};

/// Largest `n` accepted by the generate route
pub const MAX_SEQUENCES_PER_REQUEST: usize = 10;

/// Uniform response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            data: None,
            errors: Some(vec![message.clone()]),
            message: Some(message),
        }
    }
}

fn default_n() -> usize {
    1
}

fn default_temperature() -> f64 {
    0.7
}

fn default_num_forks() -> usize {
    1
}

fn default_fork_type() -> String {
    ForkType::default().as_str().to_string()
}

/// Body of `POST /cognition/generate`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub context: String,
    #[serde(default, alias = "schema_config")]
    pub schema: Option<Value>,
    #[serde(default = "default_n")]
    pub n: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl GenerateRequest {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SEQUENCES_PER_REQUEST).contains(&self.n) {
            return Err(GatewayError::Validation(format!(
                "n must be between 1 and {}",
                MAX_SEQUENCES_PER_REQUEST
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(GatewayError::Validation(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationMetadata {
    pub model: String,
    pub provider: String,
    pub processing_time: f64,
    pub temperature: f64,
    /// Sequences parsed from the model, before validation
    pub total_generated: usize,
    pub valid_sequences: usize,
    pub rejected: Vec<Rejection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub sequences: Vec<CognitionSequence>,
    pub metadata: GenerationMetadata,
}

/// Body of `POST /cognition/fork`
///
/// Nothing is persisted server side, so the caller sends the step itself.
#[derive(Debug, Clone, Deserialize)]
pub struct ForkRequest {
    pub row_id: Uuid,
    pub sequence_id: Uuid,
    #[serde(default = "default_num_forks")]
    pub num_forks: usize,
    #[serde(default = "default_fork_type")]
    pub fork_type: String,
    #[serde(default)]
    pub context: Option<String>,
    pub row: CognitionStep,
}

impl ForkRequest {
    /// Check bounds and resolve the fork type
    pub fn validate(&self) -> Result<ForkType> {
        if !(1..=MAX_FORKS).contains(&self.num_forks) {
            return Err(GatewayError::Validation(format!(
                "num_forks must be between 1 and {}",
                MAX_FORKS
            )));
        }
        if self.row.id != self.row_id {
            return Err(GatewayError::Validation(format!(
                "row_id {} does not match row.id {}",
                self.row_id, self.row.id
            )));
        }
        Ok(self.fork_type.parse()?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ForkMetadata {
    pub model: String,
    pub provider: String,
    pub processing_time: f64,
    pub fork_type: ForkType,
    pub sequence_id: Uuid,
    pub parent_id: Uuid,
    /// Forks parsed from the model, before validation
    pub total_generated: usize,
    pub valid_forks: usize,
    pub rejected: Vec<Rejection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForkResponse {
    pub forks: Vec<CognitionStep>,
    pub metadata: ForkMetadata,
}

/// Body of `POST /schemas/validate`
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaValidationRequest {
    pub data: Value,
    pub schema: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use simforge_core::Operation;

    #[test]
    fn test_generate_request_defaults_and_alias() {
        let request: GenerateRequest = serde_json::from_value(json!({
            "context": "ctx",
            "schema_config": {"type": "object"}
        }))
        .unwrap();

        assert_eq!(request.n, 1);
        assert_eq!(request.temperature, 0.7);
        assert!(request.schema.is_some());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_generate_request_bounds() {
        for (n, temperature) in [(0, 0.7), (11, 0.7), (1, -0.1), (1, 2.5)] {
            let request = GenerateRequest {
                context: "ctx".into(),
                schema: None,
                n,
                temperature,
            };
            assert!(matches!(request.validate(), Err(GatewayError::Validation(_))));
        }
    }

    #[test]
    fn test_fork_request_validation() {
        let row = CognitionStep::new("g", vec![], Operation::Act);
        let mut request: ForkRequest = serde_json::from_value(json!({
            "row_id": row.id,
            "sequence_id": Uuid::new_v4(),
            "row": row,
        }))
        .unwrap();

        assert_eq!(request.validate().unwrap(), ForkType::AlternativeOperation);

        request.fork_type = "sideways".into();
        assert!(matches!(request.validate(), Err(GatewayError::Engine(_))));

        request.fork_type = "change_goal".into();
        request.row_id = Uuid::new_v4();
        assert!(matches!(request.validate(), Err(GatewayError::Validation(_))));
    }

    #[test]
    fn test_failure_envelope() {
        let value = serde_json::to_value(ApiResponse::<()>::failure("nope")).unwrap();
        assert_eq!(value, json!({"success": false, "message": "nope", "errors": ["nope"]}));
    }
}
