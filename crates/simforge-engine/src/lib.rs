//! SimForge Engine - prompting, parsing and repair of model output
//!
//! The engine turns a free-text context into cognition sequences and forks
//! single steps into alternatives. Everything talks to a language model
//! through one seam, [`CompletionBackend`]:
//!
//! 1. **Backend Adapter** (`backend`): hosted and local chat-completions
//!    providers behind a uniform async call
//! 2. **Sequence Generator** (`generator`): `n` concurrent requests, one
//!    sequence per usable response
//! 3. **Step Forker** (`forker`): one request per call, up to five
//!    alternatives linked to the original step
//! 4. **Outcomes** (`outcome`): accepted items plus per-slot rejections
//!
//! Configuration and input errors fail the call. Undecodable or malformed
//! model output only drops the affected item.
//!
//! # Example
//!
//! ```no_run
//! use simforge_engine::{EngineConfig, ForkType, SimForge};
//!
//! # async fn run() -> simforge_engine::Result<()> {
//! let engine = SimForge::from_config(&EngineConfig::from_env()?)?;
//!
//! let batch = engine
//!     .generator()
//!     .generate("A founder deciding whether to raise a seed round", None, 3, 0.7)
//!     .await?;
//!
//! if let Some(step) = batch.accepted.first().and_then(|s| s.rows.first()) {
//!     let forks = engine
//!         .forker()
//!         .create_forks(step, 2, ForkType::InvertBeliefs, None)
//!         .await?;
//!     println!("{} forks", forks.accepted.len());
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod forker;
pub mod generator;
pub mod outcome;
mod parse;

pub use backend::{ChatCompletionsClient, CompletionBackend, ProviderBackend, ProviderKind};
pub use config::{BatchFaultPolicy, ConfidencePolicy, EngineConfig};
pub use engine::SimForge;
pub use error::{EngineError, Result};
pub use forker::{ForkType, StepForker, MAX_FORKS};
pub use generator::SequenceGenerator;
pub use outcome::{BatchOutcome, Rejection, RejectionReason};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
