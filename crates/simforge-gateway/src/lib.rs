//! SimForge Gateway - HTTP surface over the synthesis engine
//!
//! Routes (all under the configured prefix, `/api/v1` by default):
//!
//! ```text
//! GET  /health                 liveness
//! POST /cognition/generate     context -> sequences
//! POST /cognition/fork         step -> alternative steps
//! GET  /schemas[/:name]        JSON schema library
//! POST /schemas/validate       shallow schema check of a payload
//! GET  /prompts[/:name]        prompt template library
//! ```
//!
//! Every response uses the same envelope: `{success, data?, message?, errors?}`.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod library;

pub use api::ApiResponse;
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::{Gateway, GatewayState};
pub use library::{PromptFile, PromptLibrary, SchemaLibrary};

/// Gateway version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 12000;

/// Default host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default route prefix
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
