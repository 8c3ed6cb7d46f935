//! Engine bundle - one backend shared by the generator and the forker

use std::sync::Arc;

use crate::backend::{CompletionBackend, ProviderBackend};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::forker::StepForker;
use crate::generator::SequenceGenerator;

/// Generator and forker wired to the same backend.
///
/// Cheap to clone; clones share the backend and its connection pool.
#[derive(Debug, Clone)]
pub struct SimForge {
    generator: SequenceGenerator,
    forker: StepForker,
}

impl SimForge {
    /// Resolve the configured provider and build both components.
    ///
    /// Fails with `UnsupportedProvider` or `MissingCredential` before any
    /// request is made.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let backend = Arc::new(ProviderBackend::from_config(config)?);
        Ok(Self::with_backend(backend, config))
    }

    /// Build on an already constructed backend
    pub fn with_backend(backend: Arc<dyn CompletionBackend>, config: &EngineConfig) -> Self {
        let generator = SequenceGenerator::new(Arc::clone(&backend))
            .with_fault_policy(config.batch_fault_policy)
            .with_confidence_policy(config.confidence_policy);

        let forker = StepForker::new(backend)
            .with_temperature(config.fork_temperature)
            .with_confidence_policy(config.confidence_policy);

        Self { generator, forker }
    }

    pub fn generator(&self) -> &SequenceGenerator {
        &self.generator
    }

    pub fn forker(&self) -> &StepForker {
        &self.forker
    }

    /// Provider identifier of the shared backend
    pub fn provider(&self) -> &str {
        self.generator.backend().provider()
    }

    /// Model name of the shared backend
    pub fn model(&self) -> &str {
        self.generator.backend().model()
    }
}
