use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use edubot_core::config::{LlmConfig, LlmProvider};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: PromptRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: PromptRole::User, content: content.into() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub presence_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self { temperature: 0.7, max_tokens: 500, presence_penalty: 0.3 }
    }
}

impl From<&LlmConfig> for SamplingParams {
    fn from(config: &LlmConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            presence_penalty: config.presence_penalty,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("completion transport failure: {0}")]
    Transport(String),
    #[error("completion endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion response could not be decoded: {0}")]
    Decode(String),
    #[error("completion response was empty")]
    Empty,
    #[error("completion timed out after {after_secs}s")]
    Timeout { after_secs: u64 },
    #[error("completion provider is disabled")]
    Disabled,
}

impl CompletionError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
            Self::Empty => "empty",
            Self::Timeout { .. } => "timeout",
            Self::Disabled => "disabled",
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[PromptMessage],
        sampling: &SamplingParams,
    ) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
    max_tokens: u32,
    presence_penalty: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint (Groq, OpenAI, Ollama).
pub struct ChatCompletionsClient {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(
        base_url: &str,
        api_key: Option<SecretString>,
        model: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|error| CompletionError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: model.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(
        &self,
        messages: &[PromptMessage],
        sampling: &SamplingParams,
    ) -> Result<String, CompletionError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            presence_penalty: sampling.presence_penalty,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response =
            builder.send().await.map_err(|error| CompletionError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status: status.as_u16(), body });
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(|error| CompletionError::Decode(error.to_string()))?;

        extract_content(completion)
    }
}

fn extract_content(completion: ChatCompletionResponse) -> Result<String, CompletionError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(CompletionError::Empty)
}

/// Stand-in used when no provider is configured; every call fails so callers fall back.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledLlmClient;

#[async_trait]
impl LlmClient for DisabledLlmClient {
    async fn complete(
        &self,
        _messages: &[PromptMessage],
        _sampling: &SamplingParams,
    ) -> Result<String, CompletionError> {
        Err(CompletionError::Disabled)
    }
}

pub fn build_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, CompletionError> {
    if config.provider == LlmProvider::Disabled {
        return Ok(Arc::new(DisabledLlmClient));
    }

    let base_url = config.effective_base_url().ok_or(CompletionError::Disabled)?;
    let client = ChatCompletionsClient::new(&base_url, config.api_key.clone(), &config.model)?;
    Ok(Arc::new(client))
}
