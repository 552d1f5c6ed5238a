//! Single-prompt completion for a keyword.

use serde::Serialize;
use tracing::info;

use crate::app::{AppContext, prompting};
use crate::domain::{AppError, Keyword, SubstitutionContext, TokenUsage};

#[derive(Debug, Clone, Serialize)]
pub struct TextOutput {
    pub content: String,
    pub usage: TokenUsage,
    pub prompt_name: String,
    pub keyword: String,
}

pub fn execute(ctx: &AppContext, prompt_name: &str, keyword: &Keyword) -> Result<TextOutput, AppError> {
    let prompt_name = prompt_name.trim();
    if prompt_name.is_empty() {
        return Err(AppError::validation("prompt_name is required"));
    }

    let output = prompting::complete(ctx, prompt_name, &SubstitutionContext::new().with("keyword", keyword.as_str()))?;
    info!(prompt = prompt_name, keyword = %keyword, tokens = output.usage.total_tokens, "text completed");

    Ok(TextOutput {
        content: output.content,
        usage: output.usage,
        prompt_name: prompt_name.to_string(),
        keyword: keyword.as_str().to_string(),
    })
}
