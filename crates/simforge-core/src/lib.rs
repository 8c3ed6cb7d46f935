//! SimForge Core - the typed shape of synthetic cognition traces
//!
//! SimForge synthesizes "cognition traces" (sequences of goal / belief /
//! operation / output steps) by prompting a language model, and forks
//! individual steps to explore alternative reasoning paths. This crate holds
//! the pieces that involve no I/O:
//!
//! 1. **Cognition model** (`cognition`): beliefs, steps, sequences and the
//!    fixed operation vocabulary
//! 2. **Validator** (`validator`): structural re-validation of built values
//!    and a shallow JSON-schema check for caller-supplied payloads
//! 3. **Errors** (`error`): the core error taxonomy
//!
//! # Quick Start
//!
//! ```
//! use simforge_core::cognition::{Belief, CognitionSequence, CognitionStep, Operation};
//! use simforge_core::Validator;
//!
//! let step = CognitionStep::new(
//!     "Pick a travel date",
//!     vec![Belief::new("Flights are cheaper midweek", 0.8).unwrap()],
//!     Operation::Plan,
//! )
//! .with_output("Leave on a Tuesday");
//!
//! let sequence = CognitionSequence::new("Plan a trip").with_rows(vec![step]);
//! assert!(Validator::new().validate_sequence(&sequence));
//!
//! // Labels outside the vocabulary are repaired, never rejected
//! assert_eq!(Operation::repair("Fly"), Operation::Reflect);
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod cognition;
pub mod error;
pub mod types;
pub mod validator;

// Re-export commonly used types for convenience
pub use cognition::{Belief, CognitionSequence, CognitionStep, Operation};
pub use error::{CoreError, Result};
pub use types::{Metadata, MetadataValue, Timestamp};
pub use validator::{SchemaCheck, Validator, Violation};

/// Re-exported so downstream crates name ids with the same type
pub use uuid::Uuid;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
