//! Load a named prompt, substitute its context, and run one completion.

use tracing::debug;

use crate::app::AppContext;
use crate::domain::{AppError, PromptTemplate, RenderedPrompt, SubstitutionContext};
use crate::ports::{CompletionOutput, CompletionRequest};

pub(crate) fn render(
    ctx: &AppContext,
    name: &str,
    context: &SubstitutionContext,
) -> Result<(PromptTemplate, RenderedPrompt), AppError> {
    let template = ctx.prompts().load(name)?;
    let rendered = template.render(context, ctx.settings().placeholder_policy)?;
    Ok((template, rendered))
}

pub(crate) fn complete(
    ctx: &AppContext,
    name: &str,
    context: &SubstitutionContext,
) -> Result<CompletionOutput, AppError> {
    let (template, prompt) = render(ctx, name, context)?;
    debug!(prompt = name, model = %template.sampling.model, "running completion");
    ctx.completion().complete(CompletionRequest {
        sampling: template.sampling,
        prompt,
        schema: template.output_schema,
    })
}

/// Pretty JSON for substitution into prompt text.
pub(crate) fn pretty<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::parse("prompt context", e))
}
