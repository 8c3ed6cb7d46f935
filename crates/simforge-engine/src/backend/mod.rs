//! Backend Adapter - uniform access to a completion provider
//!
//! Every provider sits behind [`CompletionBackend`]. The set of built-in
//! providers is closed ([`ProviderBackend`]); adding one means adding a
//! variant, never touching the generator or forker.

pub mod chat_completions;

pub use chat_completions::ChatCompletionsClient;

use std::fmt;
use std::str::FromStr;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// Minimal completion capability consumed by the generator and forker
#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync + fmt::Debug {
    /// Run one completion and return the raw text of the first choice
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
    ) -> Result<String>;

    /// Provider identifier, for reporting
    fn provider(&self) -> &str;

    /// Model name, for reporting
    fn model(&self) -> &str;
}

/// Supported provider kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Hosted API authenticated with a bearer credential
    Hosted,
    /// Local endpoint reachable at a base URL, no credential
    Local,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Hosted => "openai",
            ProviderKind::Local => "local",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "hosted" => Ok(ProviderKind::Hosted),
            "local" => Ok(ProviderKind::Local),
            _ => Err(EngineError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// The built-in providers
#[derive(Debug, Clone)]
pub enum ProviderBackend {
    Hosted(ChatCompletionsClient),
    Local(ChatCompletionsClient),
}

impl ProviderBackend {
    /// Resolve the configured provider and build its client.
    ///
    /// The provider is resolved here, when the engine is built, not on the
    /// first completion call: an unknown provider fails with
    /// `UnsupportedProvider` and a hosted provider without a key fails with
    /// `MissingCredential` before any request is made.
    ///
    /// The HTTP connection pool is created here, once, with the configured
    /// per-call deadline.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let kind: ProviderKind = config.provider.parse()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let backend = match kind {
            ProviderKind::Hosted => {
                let api_key = config
                    .api_key
                    .clone()
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| EngineError::MissingCredential {
                        provider: kind.to_string(),
                    })?;
                let endpoint = format!(
                    "{}/chat/completions",
                    config.hosted_base_url.trim_end_matches('/')
                );
                ProviderBackend::Hosted(ChatCompletionsClient::new(
                    kind.as_str(),
                    Some(api_key),
                    endpoint,
                    &config.model,
                    http_client,
                ))
            }
            ProviderKind::Local => {
                let endpoint = format!(
                    "{}/v1/chat/completions",
                    config.local_base_url.trim_end_matches('/')
                );
                ProviderBackend::Local(ChatCompletionsClient::new(
                    kind.as_str(),
                    None,
                    endpoint,
                    &config.model,
                    http_client,
                ))
            }
        };

        tracing::info!(
            "LLM provider: {}, model: {}, endpoint: {}",
            backend.kind(),
            config.model,
            backend.client().endpoint()
        );

        Ok(backend)
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderBackend::Hosted(_) => ProviderKind::Hosted,
            ProviderBackend::Local(_) => ProviderKind::Local,
        }
    }

    fn client(&self) -> &ChatCompletionsClient {
        match self {
            ProviderBackend::Hosted(client) | ProviderBackend::Local(client) => client,
        }
    }
}

#[async_trait::async_trait]
impl CompletionBackend for ProviderBackend {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
    ) -> Result<String> {
        self.client()
            .request_completion(system_prompt, user_prompt, temperature)
            .await
    }

    fn provider(&self) -> &str {
        self.client().name()
    }

    fn model(&self) -> &str {
        self.client().model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::Hosted);
        assert_eq!("Local".parse::<ProviderKind>().unwrap(), ProviderKind::Local);
        assert!(matches!(
            "azure".parse::<ProviderKind>(),
            Err(EngineError::UnsupportedProvider(p)) if p == "azure"
        ));
    }

    #[test]
    fn test_unsupported_provider_is_fatal() {
        let config = EngineConfig::new().with_provider("mystery");
        let err = ProviderBackend::from_config(&config).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedProvider(_)));
    }

    #[test]
    fn test_hosted_requires_credential() {
        let config = EngineConfig::new().with_provider("openai");
        let err = ProviderBackend::from_config(&config).unwrap_err();
        assert!(matches!(err, EngineError::MissingCredential { .. }));
    }

    #[test]
    fn test_endpoints() {
        let hosted = ProviderBackend::from_config(
            &EngineConfig::new()
                .with_api_key("sk")
                .with_hosted_base_url("https://api.example.com/v1/"),
        )
        .unwrap();
        assert_eq!(hosted.kind(), ProviderKind::Hosted);
        assert_eq!(
            hosted.client().endpoint(),
            "https://api.example.com/v1/chat/completions"
        );

        let local = ProviderBackend::from_config(
            &EngineConfig::new()
                .with_provider("local")
                .with_local_base_url("http://localhost:11434"),
        )
        .unwrap();
        assert_eq!(local.kind(), ProviderKind::Local);
        assert_eq!(local.provider(), "local");
        assert_eq!(
            local.client().endpoint(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_local_backend_round_trip() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "{\"title\": \"T\"}"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = ProviderBackend::from_config(
            &EngineConfig::new()
                .with_provider("local")
                .with_model("llama3")
                .with_local_base_url(server.uri()),
        )
        .unwrap();

        let content = backend.complete("sys", "usr", 0.7).await.unwrap();
        assert_eq!(content, "{\"title\": \"T\"}");
        assert_eq!(backend.model(), "llama3");
    }

    #[tokio::test]
    async fn test_hosted_backend_sends_bearer() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-live"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "[]"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = ProviderBackend::from_config(
            &EngineConfig::new()
                .with_api_key("sk-live")
                .with_hosted_base_url(server.uri()),
        )
        .unwrap();

        assert_eq!(backend.complete("sys", "usr", 0.2).await.unwrap(), "[]");
    }
}
