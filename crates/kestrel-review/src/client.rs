use kestrel_core::{AnalysisKind, KestrelError, Language, LlmConfig, ReviewRequest};

use crate::llm::{ChatMessage, ChatRequest, ChatTransport, HttpTransport, Role, MODEL, TEMPERATURE};
use crate::prompt;

/// Client for the three analysis operations.
///
/// Holds the credential-bearing transport and nothing else; every call
/// is an independent request/response round trip. There is no retry, no
/// backoff, and no caching — invoking several analysis kinds for the
/// same snippet issues one request each.
///
/// # Examples
///
/// ```
/// use kestrel_core::LlmConfig;
/// use kestrel_review::client::ReviewClient;
///
/// let config = LlmConfig {
///     api_key: Some("gsk-test".into()),
///     base_url: None,
/// };
/// let client = ReviewClient::new(&config).unwrap();
/// ```
pub struct ReviewClient {
    transport: Box<dyn ChatTransport>,
}

impl ReviewClient {
    /// Create a client backed by the HTTP transport.
    ///
    /// Fails eagerly: a missing credential or an unbuildable HTTP client
    /// is rejected here, not on first use.
    ///
    /// # Errors
    ///
    /// Returns [`KestrelError::Config`] when `config` carries no API key
    /// or the underlying HTTP client cannot be initialized.
    pub fn new(config: &LlmConfig) -> Result<Self, KestrelError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self {
            transport: Box::new(transport),
        })
    }

    /// Create a client over an arbitrary transport.
    ///
    /// Used by tests to inject a fake transport that records requests
    /// and returns scripted responses.
    pub fn with_transport(transport: Box<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Run a code quality review and return the model's markdown verbatim.
    ///
    /// # Errors
    ///
    /// [`KestrelError::InvalidInput`] for empty or oversized code (no
    /// network call is made), [`KestrelError::EmptyResponse`] when the
    /// endpoint returns no choices, [`KestrelError::Analysis`] for any
    /// transport failure.
    pub async fn analyze_quality(
        &self,
        code: &str,
        language: Language,
    ) -> Result<String, KestrelError> {
        self.run(AnalysisKind::Quality, code, language).await
    }

    /// Check for vulnerabilities actually present in the code.
    ///
    /// Same validation and error shape as [`Self::analyze_quality`].
    pub async fn check_security(
        &self,
        code: &str,
        language: Language,
    ) -> Result<String, KestrelError> {
        self.run(AnalysisKind::Security, code, language).await
    }

    /// Generate test cases covering normal, edge, and error cases.
    ///
    /// Same validation and error shape as [`Self::analyze_quality`].
    pub async fn suggest_tests(
        &self,
        code: &str,
        language: Language,
    ) -> Result<String, KestrelError> {
        self.run(AnalysisKind::Tests, code, language).await
    }

    async fn run(
        &self,
        kind: AnalysisKind,
        code: &str,
        language: Language,
    ) -> Result<String, KestrelError> {
        let request = ReviewRequest::new(code, language, kind)?;

        let chat = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: prompt::system_prompt(kind).to_string(),
                },
                ChatMessage {
                    role: Role::User,
                    content: prompt::build_user_prompt(kind, &request.code, request.language),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: kind.max_tokens(),
        };

        let response = self
            .transport
            .complete(&chat)
            .await
            .map_err(|e| KestrelError::Analysis(format!("{}: {e}", kind.failure_prefix())))?;

        let Some(choice) = response.choices.into_iter().next() else {
            return Err(KestrelError::EmptyResponse);
        };
        Ok(choice.message.content)
    }
}
