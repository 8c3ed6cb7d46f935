//! Chat-completions HTTP client shared by every provider variant

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Client for an OpenAI-style `chat/completions` endpoint
///
/// Always asks for a JSON-object response, since callers parse exactly one
/// top-level JSON value per completion.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    name: String,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    http_client: reqwest::Client,
}

impl ChatCompletionsClient {
    pub fn new(
        name: impl Into<String>,
        api_key: Option<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            api_key,
            endpoint: endpoint.into(),
            model: model.into(),
            http_client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn request_completion(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let mut builder = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "application/json");

        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("{} API error ({}): {}", self.name, status, body);
            return Err(EngineError::BackendStatus {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(EngineError::EmptyCompletion)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
