//! LLM gateway: one call contract over multiple providers.
//!
//! The gateway sends a single request per review and validates the model's
//! output against a fixed schema. Transport failures ([`QuillError::Llm`])
//! and malformed review payloads ([`QuillError::Schema`]) are kept distinct
//! so callers can tell them apart. No retries, no streaming.

use std::future::Future;
use std::time::Duration;

use quill_core::{LlmConfig, Provider, QuillError, Severity};
use serde::Deserialize;

/// A review issue as it appears on the wire.
///
/// Line numbers are never part of the wire contract; they are derived
/// locally from `match_text`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WireIssue {
    /// Severity classification.
    pub severity: Severity,
    /// Issue description.
    pub message: String,
    /// Short verbatim snippet locating the issue.
    pub match_text: Option<String>,
    /// Optional fix suggestion.
    pub suggestion: Option<String>,
}

/// The validated shape of a model response.
///
/// # Examples
///
/// ```
/// use quill_review::llm::{parse_review_response, ReviewResponse};
///
/// let json = r#"{"issues":[],"summary":"Reads well."}"#;
/// let response: ReviewResponse = parse_review_response(json).unwrap();
/// assert_eq!(response.summary, "Reads well.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewResponse {
    /// Issues found, in the order the model reported them.
    pub issues: Vec<WireIssue>,
    /// Overall assessment.
    pub summary: String,
}

/// The gateway call contract.
///
/// One outbound call per invocation: system prompt and user prompt in,
/// validated [`ReviewResponse`] out. The pipeline is generic over this trait
/// so tests can substitute a canned client for the HTTP one.
pub trait ReviewClient {
    /// Send the prompts to the model and return its validated response.
    fn generate_review(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> impl Future<Output = Result<ReviewResponse, QuillError>> + Send;
}

/// HTTP client for the supported LLM providers.
///
/// Dispatches on the configured provider tag: OpenAI chat completions,
/// Anthropic messages, or Google Gemini generateContent. Each call uses the
/// resolved model name and API key.
///
/// # Examples
///
/// ```
/// use quill_core::LlmConfig;
/// use quill_review::llm::LlmClient;
///
/// let client = LlmClient::new(&LlmConfig::default(), "sk-test".into()).unwrap();
/// assert_eq!(client.model(), "gpt-4.1-mini");
/// ```
#[derive(Debug)]
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl LlmClient {
    /// Create a new client from resolved provider settings and credential.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, QuillError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| QuillError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    /// Return the model name from the configuration.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn call_openai(&self, system: &str, user: &str) -> Result<String, QuillError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": 0.1,
            "response_format": { "type": "json_object" },
        });

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| QuillError::Llm(format!("request failed: {e}")))?;
        let envelope = read_json_envelope(response).await?;

        envelope
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(|| QuillError::Schema(format!("unexpected response structure: {envelope}")))
    }

    async fn call_anthropic(&self, system: &str, user: &str) -> Result<String, QuillError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": 4096,
            "system": system,
            "messages": [
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| QuillError::Llm(format!("request failed: {e}")))?;
        let envelope = read_json_envelope(response).await?;

        envelope
            .get("content")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("text"))
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| QuillError::Schema(format!("unexpected response structure: {envelope}")))
    }

    async fn call_google(&self, system: &str, user: &str) -> Result<String, QuillError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.config.model
        );
        let body = serde_json::json!({
            "systemInstruction": { "parts": [{ "text": system }] },
            "contents": [
                { "role": "user", "parts": [{ "text": user }] },
            ],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| QuillError::Llm(format!("request failed: {e}")))?;
        let envelope = read_json_envelope(response).await?;

        envelope
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| QuillError::Schema(format!("unexpected response structure: {envelope}")))
    }
}

impl ReviewClient for LlmClient {
    async fn generate_review(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<ReviewResponse, QuillError> {
        let text = match self.config.provider {
            Provider::OpenAi => self.call_openai(system_prompt, user_prompt).await?,
            Provider::Anthropic => self.call_anthropic(system_prompt, user_prompt).await?,
            Provider::Google => self.call_google(system_prompt, user_prompt).await?,
        };
        parse_review_response(&text)
    }
}

async fn read_json_envelope(response: reqwest::Response) -> Result<serde_json::Value, QuillError> {
    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        return Err(QuillError::Llm(format!(
            "LLM API error {status}: {body_text}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| QuillError::Llm(format!("failed to parse response: {e}")))
}

/// Validate raw model output against the review response schema.
///
/// Markdown code fences around the JSON are tolerated (models occasionally
/// wrap despite instructions); anything else that deviates from the schema
/// is a [`QuillError::Schema`], never silently coerced.
///
/// # Errors
///
/// Returns [`QuillError::Schema`] when the text is not valid JSON of the
/// expected shape.
///
/// # Examples
///
/// ```
/// use quill_review::llm::parse_review_response;
///
/// let fenced = "```json\n{\"issues\":[],\"summary\":\"ok\"}\n```";
/// assert!(parse_review_response(fenced).is_ok());
/// assert!(parse_review_response("not json").is_err());
/// ```
pub fn parse_review_response(text: &str) -> Result<ReviewResponse, QuillError> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(cleaned)
        .map_err(|e| QuillError::Schema(format!("invalid review response: {e}")))
}

fn strip_code_fences(s: &str) -> &str {
    let trimmed = s.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        if let Some(inner) = rest.strip_suffix("```") {
            return inner.trim();
        }
    }
    if let Some(rest) = trimmed.strip_prefix("```") {
        if let Some(inner) = rest.strip_suffix("```") {
            return inner.trim();
        }
    }
    trimmed
}
