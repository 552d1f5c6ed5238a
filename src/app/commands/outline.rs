//! Phase 2: outline from heading terms.

use std::time::Instant;

use chrono::Utc;

use crate::app::{AppContext, prompting};
use crate::domain::terms::format_heading_terms;
use crate::domain::{
    AppError, Keyword, Outline, OutlineArtifact, PhaseMetadata, SubstitutionContext, TermsArtifact,
};
use crate::ports::ArtifactStoreExt;

pub const PROMPT: &str = "outline_creation_prompt";

pub fn execute(ctx: &AppContext, keyword: &Keyword) -> Result<OutlineArtifact, AppError> {
    let started = Instant::now();
    let terms: TermsArtifact = ctx.artifacts().load(keyword)?;

    let context = SubstitutionContext::new()
        .with("keyword", keyword.as_str())
        .with("heading_terms", format_heading_terms(&terms.headings));
    let output = prompting::complete(ctx, PROMPT, &context)?;
    let outline = Outline::from_completion(&output.content)?;

    let artifact = OutlineArtifact {
        keyword: keyword.as_str().to_string(),
        generated_at: Utc::now(),
        phase: 2,
        outline,
        metadata: PhaseMetadata {
            processing_time_ms: started.elapsed().as_millis() as u64,
            token_usage: Some(output.usage),
        },
    };
    ctx.artifacts().save(keyword, &artifact)?;
    Ok(artifact)
}
