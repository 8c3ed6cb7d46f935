//! Cognition Module - the typed shape of a reasoning trace
//!
//! ```text
//! CognitionSequence
//!   +-- rows: [CognitionStep]
//!         +-- goal
//!         +-- beliefs: [Belief { content, confidence, source }]
//!         +-- operation: Reflect | Act | Plan | Fork
//!         +-- output
//!         +-- parent_id (forks only)
//! ```

pub mod belief;
pub mod operation;
pub mod sequence;
pub mod step;

pub use belief::{Belief, DEFAULT_CONFIDENCE};
pub use operation::Operation;
pub use sequence::{CognitionSequence, UNTITLED_SEQUENCE};
pub use step::CognitionStep;
