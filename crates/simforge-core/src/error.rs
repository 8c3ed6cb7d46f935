//! Error types for SimForge Core
//!
//! This module defines the errors raised by the cognition data model.
//! We use `thiserror` for ergonomic error definitions with automatic Display/Error implementations.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for the cognition data model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A belief confidence fell outside `[0.0, 1.0]` or was not a finite number
    #[error("Belief confidence must be in range [0.0, 1.0], got {0}")]
    ConfidenceOutOfRange(f64),

    /// Strict operation parsing met a label outside the fixed vocabulary
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::ConfidenceOutOfRange(1.4).to_string(),
            "Belief confidence must be in range [0.0, 1.0], got 1.4"
        );
        assert_eq!(
            CoreError::UnknownOperation("Fly".to_string()).to_string(),
            "Unknown operation: Fly"
        );
    }
}
