//! Engine configuration
//!
//! Configuration is an explicit value handed to the engine at construction.
//! Nothing here is process-global, so tests can run engines with different
//! backends side by side.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{EngineError, Result};

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_HOSTED_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_FORK_TEMPERATURE: f64 = 0.8;

/// What a batch does when one of its backend calls hits a transport fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchFaultPolicy {
    /// Wait for every call, then fail the whole batch with the first fault
    #[default]
    FailFast,
    /// Record each fault as a rejected slot and keep the rest
    Isolate,
}

impl FromStr for BatchFaultPolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail_fast" => Ok(Self::FailFast),
            "isolate" => Ok(Self::Isolate),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown batch fault policy '{}'",
                other
            ))),
        }
    }
}

/// How model-produced confidence outside `[0.0, 1.0]` is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidencePolicy {
    /// Reject the enclosing item
    #[default]
    Reject,
    /// Clamp into range
    Clamp,
}

impl FromStr for ConfidencePolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "clamp" => Ok(Self::Clamp),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown confidence policy '{}'",
                other
            ))),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Provider identifier, resolved when the backend is built
    pub provider: String,

    /// Model name sent with every request
    pub model: String,

    /// Bearer credential for the hosted provider
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Base URL of the hosted provider (`/chat/completions` is appended)
    pub hosted_base_url: String,

    /// Base URL of a local provider (`/v1/chat/completions` is appended)
    pub local_base_url: String,

    /// Per-call deadline in seconds, shared by every request of the engine
    pub request_timeout_secs: u64,

    /// Sampling temperature for fork requests
    pub fork_temperature: f64,

    /// Transport fault handling within a generation batch
    pub batch_fault_policy: BatchFaultPolicy,

    /// Out-of-range confidence handling
    pub confidence_policy: ConfidencePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            hosted_base_url: DEFAULT_HOSTED_BASE_URL.to_string(),
            local_base_url: DEFAULT_LOCAL_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            fork_temperature: DEFAULT_FORK_TEMPERATURE,
            batch_fault_policy: BatchFaultPolicy::default(),
            confidence_policy: ConfidencePolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the process environment, reading a `.env` file first if present
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {:?}", path);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(provider) = lookup("LLM_PROVIDER") {
            config.provider = provider;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            config.model = model;
        }
        config.api_key = lookup("LLM_API_KEY").filter(|key| !key.trim().is_empty());
        if let Some(url) = lookup("LLM_BASE_URL") {
            config.hosted_base_url = url;
        }
        if let Some(url) = lookup("LOCAL_LLM_URL") {
            config.local_base_url = url;
        }
        if let Some(secs) = lookup("LLM_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_number("LLM_TIMEOUT_SECS", &secs)?;
        }
        if let Some(temperature) = lookup("FORK_TEMPERATURE") {
            config.fork_temperature = parse_number("FORK_TEMPERATURE", &temperature)?;
        }
        if let Some(policy) = lookup("BATCH_FAULT_POLICY") {
            config.batch_fault_policy = policy.parse()?;
        }
        if let Some(policy) = lookup("CONFIDENCE_POLICY") {
            config.confidence_policy = policy.parse()?;
        }

        Ok(config)
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_hosted_base_url(mut self, url: impl Into<String>) -> Self {
        self.hosted_base_url = url.into();
        self
    }

    pub fn with_local_base_url(mut self, url: impl Into<String>) -> Self {
        self.local_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_batch_fault_policy(mut self, policy: BatchFaultPolicy) -> Self {
        self.batch_fault_policy = policy;
        self
    }

    pub fn with_confidence_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.confidence_policy = policy;
        self
    }

    /// The per-call deadline
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| EngineError::InvalidConfig(format!("{} must be a number, got '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4o");
        assert!(config.api_key.is_none());
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.fork_temperature, 0.8);
        assert_eq!(config.batch_fault_policy, BatchFaultPolicy::FailFast);
        assert_eq!(config.confidence_policy, ConfidencePolicy::Reject);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("LLM_PROVIDER", "local"),
            ("LLM_MODEL", "llama3"),
            ("LOCAL_LLM_URL", "http://127.0.0.1:8080"),
            ("LLM_TIMEOUT_SECS", "15"),
            ("BATCH_FAULT_POLICY", "isolate"),
            ("CONFIDENCE_POLICY", "Clamp"),
        ]))
        .unwrap();

        assert_eq!(config.provider, "local");
        assert_eq!(config.model, "llama3");
        assert_eq!(config.local_base_url, "http://127.0.0.1:8080");
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.batch_fault_policy, BatchFaultPolicy::Isolate);
        assert_eq!(config.confidence_policy, ConfidencePolicy::Clamp);
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = EngineConfig::from_lookup(lookup(&[("LLM_API_KEY", "  ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        let err = EngineConfig::from_lookup(lookup(&[("LLM_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));

        let err = EngineConfig::from_lookup(lookup(&[("CONFIDENCE_POLICY", "ignore")])).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn test_api_key_is_not_serialized() {
        let config = EngineConfig::new().with_api_key("sk-secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
