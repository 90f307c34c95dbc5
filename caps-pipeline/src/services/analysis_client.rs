//! Comment analysis via a chat-completion capability
//!
//! Each comment is embedded verbatim in a fixed prompt that asks for a
//! two-to-three sentence analysis plus a sentiment label, returned as a
//! minimal JSON object. Requests use temperature 0 so identical text yields
//! reproducible output.
//!
//! # Reply schema (v1)
//! ```json
//! {"analysis": "<2-3 sentences>", "sentiment": "enthusiastic|critical|objective"}
//! ```
//! Exactly these two fields; anything else is a schema violation.
//!
//! # Failure handling
//! [`AnalysisClient::analyze`] never fails. Unreachable capability, malformed
//! replies and schema violations are classified separately in
//! [`AnalysisError`] but all produce the same degraded [`AnalysisOutcome`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{AnalysisOutcome, Sentiment};

/// Version tag of the reply schema the prompt asks for
pub const REPLY_SCHEMA_VERSION: u32 = 1;

/// Sampling temperature for every request
pub const ANALYSIS_TEMPERATURE: f32 = 0.0;

const USER_AGENT: &str = concat!("caps-pipeline/", env!("CARGO_PKG_VERSION"));

/// Analysis failure classes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Capability could not be reached or refused the request
    #[error("analysis capability unavailable: {0}")]
    Unavailable(String),

    /// Capability answered, but not with a JSON reply
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),

    /// Reply was JSON but did not match the v1 schema
    #[error("analysis reply violates schema v{}: {}", REPLY_SCHEMA_VERSION, .0)]
    SchemaViolation(String),
}

/// Build the fixed instruction prompt for one comment
pub fn build_prompt(text: &str) -> String {
    format!(
        "Analyze this comment in 2-3 sentences and classify its sentiment as \
enthusiastic, critical, or objective:\n\
\n\
{text}\n\
\n\
Respond ONLY with a valid JSON object of exactly this form:\n\
{{\n  \"analysis\": \"...\",\n  \"sentiment\": \"enthusiastic/critical/objective\"\n}}\n"
    )
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnalysisReplyV1 {
    analysis: String,
    sentiment: Sentiment,
}

/// Validate a capability reply against the v1 schema
pub fn parse_reply(content: &str) -> Result<(String, Sentiment), AnalysisError> {
    let value: Value = serde_json::from_str(content.trim())
        .map_err(|e| AnalysisError::MalformedResponse(format!("reply is not JSON: {}", e)))?;

    if !value.is_object() {
        return Err(AnalysisError::SchemaViolation(
            "reply is not a JSON object".to_string(),
        ));
    }

    let reply: AnalysisReplyV1 =
        serde_json::from_value(value).map_err(|e| AnalysisError::SchemaViolation(e.to_string()))?;

    Ok((reply.analysis, reply.sentiment))
}

/// Raw chat-completion capability: prompt in, message content out
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AnalysisError>;
}

/// Per-comment analysis boundary used by the orchestrator
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyze one comment; failures come back as degraded outcomes
    async fn analyze(&self, text: &str) -> AnalysisOutcome;
}

/// Prompt construction + reply validation on top of a [`ChatBackend`]
pub struct AnalysisClient {
    backend: Arc<dyn ChatBackend>,
}

impl AnalysisClient {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    async fn try_analyze(&self, text: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let prompt = build_prompt(text);
        let content = self.backend.complete(&prompt).await?;
        let (summary, sentiment) = parse_reply(&content)?;
        Ok(AnalysisOutcome::success(summary, sentiment))
    }
}

#[async_trait]
impl Analyzer for AnalysisClient {
    async fn analyze(&self, text: &str) -> AnalysisOutcome {
        match self.try_analyze(text).await {
            Ok(outcome) => {
                debug!(sentiment = %outcome.sentiment, "Comment analyzed");
                outcome
            }
            Err(e) => {
                warn!(error = %e, "Analysis degraded");
                AnalysisOutcome::degraded(e.to_string())
            }
        }
    }
}

// ============================================================================
// OpenAI-compatible chat completion backend
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// `POST {base_url}/chat/completions` client
pub struct OpenAiChatBackend {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiChatBackend {
    /// Create backend. A missing API key is not an error here: every call
    /// then reports the capability as unavailable.
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AnalysisError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::Unavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for OpenAiChatBackend {
    async fn complete(&self, prompt: &str) -> Result<String, AnalysisError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AnalysisError::Unavailable("API key not configured".to_string()))?;

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: ANALYSIS_TEMPERATURE,
        };

        debug!(model = %self.model, "Sending chat completion request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Unavailable(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AnalysisError::MalformedResponse("completion has no message content".to_string())
            })
    }
}
