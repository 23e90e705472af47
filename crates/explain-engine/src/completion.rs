//! Chat-completion transport

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ExplainConfig;
use crate::error::ExplainError;

/// One-shot text completion
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Return the raw message content for a system + user prompt pair
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ExplainError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
    }
}

/// OpenAI-compatible chat-completions client
pub struct OpenAiClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: &ExplainConfig, api_key: impl Into<String>) -> Result<Self, ExplainError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ExplainError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn request_body<'a>(&'a self, system: &'a str, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ExplainError> {
        debug!(model = %self.model, "Requesting completion");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(system, prompt))
            .send()
            .await
            .map_err(|e| ExplainError::Completion(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ExplainError::Completion(format!(
                "Completion API error: {} - {}",
                status,
                detail.trim()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| {
                ExplainError::Completion(format!("Unreadable completion response: {}", e))
            })?;

        body.into_content()
            .ok_or_else(|| ExplainError::Completion("No content in completion response".into()))
    }
}
