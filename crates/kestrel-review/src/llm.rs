use std::time::Duration;

use async_trait::async_trait;
use kestrel_core::{KestrelError, LlmConfig, API_KEY_ENV};
use serde::{Deserialize, Serialize};

/// Pinned model identifier used for every analysis request.
pub const MODEL: &str = "llama-3.1-8b-instant";

/// Sampling temperature shared by all three analysis kinds.
pub const TEMPERATURE: f32 = 0.3;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";

/// A message in a chat conversation with the model.
///
/// # Examples
///
/// ```
/// use kestrel_review::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage {
///     role: Role::User,
///     content: "Review this code".into(),
/// };
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

/// Role in the chat conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level persona instructions.
    System,
    /// User input.
    User,
    /// Assistant response.
    Assistant,
}

/// Request body for the chat completions endpoint.
///
/// Serializes to the OpenAI-compatible wire format: model id, message
/// list, temperature, and completion token budget.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Two-message conversation: system persona, then the rendered template.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token budget for this operation.
    pub max_tokens: u32,
}

/// Response body from the chat completions endpoint.
///
/// A response that deserializes but carries no choices is valid at this
/// layer; the client maps it to [`KestrelError::EmptyResponse`].
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Candidate completions, possibly empty.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One candidate completion.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The message holding the completion text.
    pub message: ChoiceMessage,
}

/// The message inside a completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    /// Completion text, returned verbatim to callers.
    #[serde(default)]
    pub content: String,
}

/// A failure at the transport layer.
///
/// Carries only the cause; the review client prepends the
/// operation-specific prefix when wrapping it into
/// [`KestrelError::Analysis`].
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Connection to an OpenAI-compatible chat completions endpoint.
///
/// The production implementation is [`HttpTransport`]; tests inject a
/// fake that records requests and returns scripted responses.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one completion request and return the parsed response.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;
}

/// HTTP transport for the chat completions endpoint.
///
/// Works with any provider exposing `/v1/chat/completions`; defaults to
/// the Groq endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`KestrelError::Config`] when the config carries no API
    /// key, or when the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, KestrelError> {
        let Some(api_key) = config.api_key.clone() else {
            return Err(KestrelError::Config(format!("{API_KEY_ENV} is required")));
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| KestrelError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    /// The endpoint base URL in use.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError(format!("API error {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| TransportError(format!("failed to parse response: {e}")))
    }
}
