//! Text-generation collaborator.
//!
//! `OpenRouterClient` speaks the OpenAI-compatible chat completions API:
//! request `{model, messages: [{role, content}]}`, reply text at
//! `choices[0].message.content`.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const REFERER: &str = "https://kpi-dashboard.local";
const TITLE: &str = "Hotel KPI Assistant";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("text generation service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("unexpected response from text generation service: {0}")]
    MalformedResponse(String),
}

pub trait TextGenerator: Send + Sync {
    fn complete(&self, prompt: &str, model_id: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenRouterClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ServiceUnavailable(format!("client init failed: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

impl TextGenerator for OpenRouterClient {
    fn complete(&self, prompt: &str, model_id: &str) -> Result<String, LlmError> {
        let payload = ChatRequest {
            model: model_id,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        info!(model = model_id, prompt_len = prompt.len(), "requesting completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .json(&payload)
            .send()
            .map_err(|e| {
                warn!(error = %e, "completion request failed");
                LlmError::ServiceUnavailable(format!("request failed: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| LlmError::ServiceUnavailable(format!("reading response failed: {e}")))?;

        if !status.is_success() {
            let truncated: String = body.chars().take(300).collect();
            warn!(%status, body = %truncated, "completion request rejected");
            return Err(LlmError::ServiceUnavailable(format!("HTTP {status}: {truncated}")));
        }

        let text = parse_completion(&body)?;
        debug!(text_len = text.len(), "completion received");
        Ok(text)
    }
}

/// Stand-in used when no API key is configured.
pub struct UnconfiguredGenerator;

impl TextGenerator for UnconfiguredGenerator {
    fn complete(&self, _prompt: &str, _model_id: &str) -> Result<String, LlmError> {
        Err(LlmError::ServiceUnavailable(
            "OPENROUTER_API_KEY is not set".into(),
        ))
    }
}

/// Reads `choices[0].message.content` out of a chat completion body.
pub fn parse_completion(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::MalformedResponse(format!("invalid JSON: {e}")))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| LlmError::MalformedResponse("missing choices[0].message.content".into()))
}
