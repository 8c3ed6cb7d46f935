//! Error types for the synthesis engine

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine error type
///
/// Configuration and input errors are raised immediately and never retried.
/// Transport faults surface from the backend call that hit them. Decode and
/// field-level faults never appear here: they are recovered per item and
/// reported through [`crate::BatchOutcome`].
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unsupported LLM provider: {0}")]
    UnsupportedProvider(String),

    #[error("Unsupported fork type: {0}")]
    UnsupportedForkType(String),

    #[error("API key not provided for provider {provider}")]
    MissingCredential { provider: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend API error ({status}): {body}")]
    BackendStatus { status: u16, body: String },

    #[error("Backend returned no completion content")]
    EmptyCompletion,

    #[error("Backend error: {0}")]
    Backend(String),
}

impl EngineError {
    /// Whether the error came from configuration or caller input rather than the backend
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            EngineError::UnsupportedProvider(_)
                | EngineError::UnsupportedForkType(_)
                | EngineError::MissingCredential { .. }
                | EngineError::InvalidConfig(_)
                | EngineError::InvalidArgument(_)
        )
    }

    /// Whether the error is a transport-level fault of a backend call
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            EngineError::Transport(_)
                | EngineError::BackendStatus { .. }
                | EngineError::EmptyCompletion
                | EngineError::Backend(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(EngineError::UnsupportedProvider("azure".into()).is_caller_error());
        assert!(EngineError::InvalidArgument("n".into()).is_caller_error());
        assert!(EngineError::EmptyCompletion.is_transport());

        let status = EngineError::BackendStatus {
            status: 503,
            body: "overloaded".into(),
        };
        assert!(status.is_transport());
        assert!(!status.is_caller_error());
        assert_eq!(status.to_string(), "Backend API error (503): overloaded");
    }
}
