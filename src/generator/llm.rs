use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_TOKENS: u32 = 2500;
pub const TEMPERATURE: f64 = 0.5;
pub const TOP_P: f64 = 0.95;
pub const PRESENCE_PENALTY: f64 = 0.0;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to the completion service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("completion service returned no content")]
    EmptyCompletion,
}

pub type Result<T> = std::result::Result<T, LlmError>;

/// A text-completion backend: prompt in, completion out.
///
/// Implementations issue exactly one request per call; retrying is left to
/// the caller.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Connection settings for an OpenAI-compatible chat completion API.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    presence_penalty: f64,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for `POST {base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Self {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    pub fn with_http_client(http: reqwest::Client, config: LlmConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    #[tracing::instrument(skip_all, fields(model = %self.config.model, prompt_len = prompt.len()))]
    async fn chat(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            presence_penalty: PRESENCE_PENALTY,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "completion request rejected");
            return Err(LlmError::Status { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyCompletion)?;

        tracing::debug!(completion_len = content.len(), "completion received");
        Ok(content.trim().to_string())
    }
}

#[async_trait::async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat(prompt).await
    }
}
