//! OpenAI-compatible chat-completions client using reqwest.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::domain::config::{OPENAI_API_KEY, OpenAiConfig};
use crate::domain::{AppError, OutputSchema, QualityAssessment, SamplingParams, TokenUsage};
use crate::ports::{
    AssessmentRequest, CompletionClient, CompletionOutput, CompletionRequest, QualityAssessor,
};

const SERVICE: &str = "OpenAI";

/// HTTP client for the chat-completions endpoint.
///
/// A missing API key is reported per call so the process can start without one.
#[derive(Clone)]
pub struct HttpCompletionClient {
    api_key: Option<String>,
    api_url: Url,
    client: Client,
}

impl std::fmt::Debug for HttpCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionClient")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpCompletionClient {
    pub fn new(api_key: Option<String>, config: &OpenAiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { api_key, api_url: config.endpoint()?, client })
    }

    /// Create with the key from `OPENAI_API_KEY`, if set.
    pub fn from_env_with_config(config: &OpenAiConfig) -> Result<Self, AppError> {
        Self::new(read_key(OPENAI_API_KEY), config)
    }

    fn send(&self, body: &ChatRequest) -> Result<CompletionOutput, AppError> {
        let api_key = self.api_key.as_deref().ok_or(AppError::MissingCredential(OPENAI_API_KEY))?;

        debug!(model = %body.model, url = %self.api_url, "submitting chat completion");
        let response = self
            .client
            .post(self.api_url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .map_err(|e| transport(None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(transport(Some(status.as_u16()), truncate(&error_text)));
        }

        let reply: ChatResponse =
            response.json().map_err(|e| AppError::parse("OpenAI response", e))?;
        let usage = reply.usage.unwrap_or_default();
        let message = reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| empty("choices"))?;

        let content = message
            .content
            .filter(|c| !c.trim().is_empty())
            .or_else(|| message.function_call.map(|f| f.arguments).filter(|a| !a.trim().is_empty()))
            .ok_or_else(|| empty("content"))?;

        debug!(total_tokens = usage.total_tokens, "chat completion received");
        Ok(CompletionOutput { content, usage })
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, request: CompletionRequest) -> Result<CompletionOutput, AppError> {
        let body = ChatRequest::new(
            &request.sampling,
            vec![
                ChatMessage::text("system", request.prompt.system),
                ChatMessage::text("user", request.prompt.user),
            ],
            request.schema,
        );
        self.send(&body)
    }
}

/// Vision grading over the same chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct HttpVisionClient {
    inner: HttpCompletionClient,
}

impl HttpVisionClient {
    pub fn new(inner: HttpCompletionClient) -> Self {
        Self { inner }
    }
}

impl QualityAssessor for HttpVisionClient {
    fn assess(&self, request: AssessmentRequest) -> Result<QualityAssessment, AppError> {
        let url = request.image_url.trim();
        let is_http = Url::parse(url).map(|u| matches!(u.scheme(), "http" | "https")).unwrap_or(false);
        if !is_http {
            return Err(AppError::InvalidImageReference(request.image_url));
        }

        let started = Instant::now();
        let body = ChatRequest::new(
            &request.sampling,
            vec![
                ChatMessage::text("system", request.prompt.system),
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text { text: request.prompt.user },
                        ContentPart::ImageUrl {
                            image_url: ImageReference { url: url.to_string(), detail: "auto" },
                        },
                    ]),
                },
            ],
            None,
        );
        let output = self.inner.send(&body)?;

        let mut assessment = QualityAssessment::from_reply(&output.content)?;
        assessment.processing_time_ms = started.elapsed().as_millis() as u64;
        Ok(assessment)
    }
}

fn read_key(var: &str) -> Option<String> {
    std::env::var(var).ok().map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}

fn transport(status: Option<u16>, message: String) -> AppError {
    AppError::Transport { service: SERVICE, status, message }
}

fn empty(what: &str) -> AppError {
    AppError::EmptyResponse { service: SERVICE, what: what.to_string() }
}

fn truncate(text: &str) -> String {
    const LIMIT: usize = 500;
    let trimmed = text.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
    frequency_penalty: f64,
    presence_penalty: f64,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    functions: Option<Vec<OutputSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionChoice>,
}

impl ChatRequest {
    fn new(sampling: &SamplingParams, messages: Vec<ChatMessage>, schema: Option<OutputSchema>) -> Self {
        let function_call = schema.as_ref().map(|s| FunctionChoice { name: s.name.clone() });
        Self {
            model: sampling.model.clone(),
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            top_p: sampling.top_p,
            frequency_penalty: sampling.frequency_penalty,
            presence_penalty: sampling.presence_penalty,
            messages,
            functions: schema.map(|s| vec![s]),
            function_call,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

impl ChatMessage {
    fn text(role: &'static str, content: String) -> Self {
        Self { role, content: MessageContent::Text(content) }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageReference },
}

#[derive(Debug, Serialize)]
struct ImageReference {
    url: String,
    detail: &'static str,
}

#[derive(Debug, Serialize)]
struct FunctionChoice {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    #[serde(default)]
    arguments: String,
}
