//! Google Gemini client over the `generateContent` REST endpoint.
//!
//! Each [`GeminiChat`] keeps its own history and resends it in full on every
//! turn, together with the system instruction and generation parameters.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use rapal_core::config::{Config, GenerationConfig, ModelConfig};
use rapal_core::types::ChatTurn;

use crate::error::{ProviderError, ProviderErrorKind};
use crate::persona;
use crate::traits::{ChatModel, Conversation};

/// Public Gemini API endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Finish reasons that mean the reply was withheld by a content filter.
const BLOCKED_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    max_output_tokens: u32,
}

impl From<&GenerationConfig> for WireGenerationConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

// ─────────────────────────────────────────────
// GeminiModel
// ─────────────────────────────────────────────

/// Connection settings shared by every conversation of one model.
struct Endpoint {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    system_instruction: String,
    generation: WireGenerationConfig,
}

/// A configured Gemini model. Cheap to clone; conversations share its
/// HTTP client.
#[derive(Clone)]
pub struct GeminiModel {
    endpoint: Arc<Endpoint>,
}

impl std::fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiModel")
            .field("url", &self.endpoint.url)
            .field("model", &self.endpoint.model)
            .finish()
    }
}

impl GeminiModel {
    pub fn new(model: &ModelConfig, generation: &GenerationConfig) -> Self {
        let api_base = model
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');
        let url = format!("{}/v1beta/models/{}:generateContent", api_base, model.name);

        let client = reqwest::Client::builder()
            .timeout(model.request_timeout())
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build HTTP client with timeout, using defaults");
                reqwest::Client::new()
            });

        GeminiModel {
            endpoint: Arc::new(Endpoint {
                client,
                url,
                api_key: model.api_key.clone(),
                model: model.name.clone(),
                system_instruction: persona::system_instruction(model).to_string(),
                generation: generation.into(),
            }),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.model, &config.generation)
    }

    /// Full `generateContent` URL.
    pub fn url(&self) -> &str {
        &self.endpoint.url
    }
}

impl ChatModel for GeminiModel {
    fn start_chat(&self) -> Box<dyn Conversation> {
        Box::new(GeminiChat {
            endpoint: self.endpoint.clone(),
            history: Vec::new(),
        })
    }

    fn model_name(&self) -> &str {
        &self.endpoint.model
    }
}

// ─────────────────────────────────────────────
// GeminiChat
// ─────────────────────────────────────────────

/// One Gemini conversation.
pub struct GeminiChat {
    endpoint: Arc<Endpoint>,
    history: Vec<ChatTurn>,
}

impl GeminiChat {
    fn build_request<'a>(&'a self, text: &'a str) -> GenerateContentRequest<'a> {
        let mut contents: Vec<Content<'a>> = self
            .history
            .iter()
            .map(|turn| Content {
                role: Some(turn.role.as_str()),
                parts: vec![Part { text: &turn.text }],
            })
            .collect();
        contents.push(Content {
            role: Some("user"),
            parts: vec![Part { text }],
        });

        GenerateContentRequest {
            contents,
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &self.endpoint.system_instruction,
                }],
            },
            generation_config: self.endpoint.generation,
        }
    }

    async fn generate(&self, text: &str) -> Result<String, ProviderError> {
        let endpoint = &self.endpoint;

        debug!(
            model = %endpoint.model,
            history = self.history.len(),
            "calling Gemini"
        );

        let response = endpoint
            .client
            .post(&endpoint.url)
            .header("x-goog-api-key", &endpoint.api_key)
            .json(&self.build_request(text))
            .send()
            .await
            .map_err(|e| {
                error!(model = %endpoint.model, error = %e, "HTTP request failed");
                ProviderError::new(ProviderErrorKind::Network, format!("Request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(model = %endpoint.model, status = %status, body = %body, "API error");
            return Err(classify_http_error(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            error!(model = %endpoint.model, error = %e, "failed to parse Gemini response");
            ProviderError::new(
                ProviderErrorKind::Parse,
                format!("Failed to parse response: {}", e),
            )
        })?;

        extract_reply(parsed)
    }
}

#[async_trait]
impl Conversation for GeminiChat {
    async fn send_message(&mut self, text: &str) -> Result<String, ProviderError> {
        let reply = self.generate(text).await?;
        self.history.push(ChatTurn::user(text));
        self.history.push(ChatTurn::model(reply.clone()));
        debug!(
            model = %self.endpoint.model,
            history = self.history.len(),
            reply_chars = reply.chars().count(),
            "Gemini reply received"
        );
        Ok(reply)
    }

    fn history(&self) -> &[ChatTurn] {
        &self.history
    }
}

// ─────────────────────────────────────────────
// Response classification
// ─────────────────────────────────────────────

/// Turn a non-success response into a [`ProviderError`].
fn classify_http_error(status: u16, body: &str) -> ProviderError {
    let api_error = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let exhausted = api_error
        .as_ref()
        .and_then(|e| e.status.as_deref())
        .is_some_and(|s| s == "RESOURCE_EXHAUSTED");

    let detail = match &api_error {
        Some(e) if !e.message.is_empty() => e.message.as_str(),
        _ => body,
    };
    let message = format!("API error ({}): {}", status, detail);

    let kind = if status == 429 || exhausted {
        ProviderErrorKind::Quota
    } else {
        ProviderErrorKind::Http
    };
    ProviderError::new(kind, message).with_status(status)
}

/// Pull the reply text out of a successful response.
fn extract_reply(response: GenerateContentResponse) -> Result<String, ProviderError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ProviderError::new(
            ProviderErrorKind::Safety,
            format!("Prompt blocked: {}", reason),
        ));
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        ProviderError::new(ProviderErrorKind::Empty, "No candidates in Gemini response")
    })?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if BLOCKED_FINISH_REASONS.contains(&reason) {
            return Err(ProviderError::new(
                ProviderErrorKind::Safety,
                format!("Response blocked: finish reason {}", reason),
            ));
        }
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::new(
            ProviderErrorKind::Empty,
            format!(
                "Empty reply (finish reason {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        ));
    }
    Ok(text)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
