//! Chat-completion port definition.

use crate::domain::{AppError, OutputSchema, RenderedPrompt, SamplingParams, TokenUsage};

/// A single two-message completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub sampling: SamplingParams,
    pub prompt: RenderedPrompt,
    /// When present, the reply is constrained to this function schema.
    pub schema: Option<OutputSchema>,
}

/// Raw text content plus token accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutput {
    pub content: String,
    pub usage: TokenUsage,
}

/// Port for the LLM completion endpoint. One attempt per call.
pub trait CompletionClient: Send + Sync {
    fn complete(&self, request: CompletionRequest) -> Result<CompletionOutput, AppError>;
}
