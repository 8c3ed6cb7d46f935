//! Gateway configuration

use serde::{Deserialize, Serialize};
use simforge_engine::EngineConfig;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{GatewayError, Result};
use crate::{DEFAULT_API_PREFIX, DEFAULT_HOST, DEFAULT_PORT};

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Prefix every route is mounted under
    pub api_prefix: String,

    /// Directory of `<name>.json` schemas
    pub schemas_dir: PathBuf,

    /// Directory of `<name>.txt` prompt templates
    pub prompts_dir: PathBuf,

    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_level: String,

    /// Engine settings
    pub engine: EngineConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            schemas_dir: PathBuf::from("schemas"),
            prompts_dir: PathBuf::from("prompts"),
            log_level: "info".to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the process environment, reading a `.env` file first if present
    pub fn from_env() -> Result<Self> {
        let engine = EngineConfig::from_env()?;
        Self::from_lookup(|key| std::env::var(key).ok()).map(|config| config.with_engine(engine))
    }

    /// Build the gateway fields from any key lookup; the engine keeps its defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| GatewayError::InvalidConfig(format!("PORT is not a port number: {}", port)))?;
        }
        if let Some(prefix) = lookup("API_PREFIX") {
            config.api_prefix = prefix;
        }
        if let Some(dir) = lookup("SCHEMAS_DIR") {
            config.schemas_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("PROMPTS_DIR") {
            config.prompts_dir = PathBuf::from(dir);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level.to_lowercase();
        }

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Set the host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_schemas_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.schemas_dir = dir.into();
        self
    }

    pub fn with_prompts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompts_dir = dir.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| {
                GatewayError::InvalidConfig(format!(
                    "Invalid socket address: {}:{}",
                    self.host, self.port
                ))
            })
    }

    /// Route prefix normalized to `/segment` form; empty when mounted at the root
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.api_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }
}
