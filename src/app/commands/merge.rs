//! Phase 3: attach body terms to outline sections.

use std::time::Instant;

use chrono::Utc;
use tracing::warn;

use crate::app::{AppContext, prompting};
use crate::domain::artifacts::MergeMetadata;
use crate::domain::outline::parse_merged_sections;
use crate::domain::terms::format_body_terms;
use crate::domain::{
    AppError, Keyword, MergedOutlineArtifact, OutlineArtifact, SubstitutionContext, TermsArtifact,
};
use crate::ports::ArtifactStoreExt;

pub const PROMPT: &str = "outline_kw_merge_prompt";

pub fn execute(ctx: &AppContext, keyword: &Keyword) -> Result<MergedOutlineArtifact, AppError> {
    let started = Instant::now();
    let outline: OutlineArtifact = ctx.artifacts().load(keyword)?;
    let terms: TermsArtifact = ctx.artifacts().load(keyword)?;

    let context = SubstitutionContext::new()
        .with("keyword", keyword.as_str())
        .with("article_outline", outline.outline.numbered())
        .with("body_terms", format_body_terms(&terms.body_terms));
    let output = prompting::complete(ctx, PROMPT, &context)?;
    let sections = parse_merged_sections(&output.content)?;
    let original_sections = outline.outline.sections.len();
    if sections.len() != original_sections {
        warn!(
            keyword = %keyword,
            merged = sections.len(),
            original = original_sections,
            "merged outline section count differs from outline"
        );
    }

    let artifact = MergedOutlineArtifact {
        keyword: keyword.as_str().to_string(),
        generated_at: Utc::now(),
        phase: 3,
        metadata: MergeMetadata {
            processing_time_ms: started.elapsed().as_millis() as u64,
            body_terms_used: sections.iter().map(|s| s.term_count()).sum(),
            original_sections,
            token_usage: Some(output.usage),
        },
        sections,
    };
    ctx.artifacts().save(keyword, &artifact)?;
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::commands::{outline, research_terms};
    use crate::testing::{Harness, fixtures};

    #[test]
    fn merges_terms_into_every_section() {
        let harness = Harness::new();
        harness.research.set_payload(fixtures::research_payload());
        harness.completion.reply("create_outline", fixtures::outline_reply());
        harness.completion.reply("merge_outline_terms", fixtures::merge_reply());
        let ctx = harness.context();
        let keyword = Keyword::new("raccoon removal houston").unwrap();
        research_terms::execute(&ctx, &keyword).unwrap();
        outline::execute(&ctx, &keyword).unwrap();

        let merged = execute(&ctx, &keyword).unwrap();

        assert_eq!(merged.sections.len(), 6);
        assert!(merged.sections.iter().all(|s| s.term_count() > 0));
        assert_eq!(merged.metadata.original_sections, 6);
        assert_eq!(merged.metadata.body_terms_used, 24);

        let user = &harness.completion.requests_for("merge_outline_terms")[0].prompt.user;
        assert!(user.contains("1. Signs of Raccoons in Your Houston Home: "));
        assert!(user.contains("raccoons (95% usage, suggested: 8-14 times)"));
    }

    #[test]
    fn empty_merge_reply_fails_without_saving() {
        let harness = Harness::new();
        harness.research.set_payload(fixtures::research_payload());
        harness.completion.reply("create_outline", fixtures::outline_reply());
        harness.completion.reply("merge_outline_terms", r#"{"sections": []}"#);
        let ctx = harness.context();
        let keyword = Keyword::new("raccoon removal houston").unwrap();
        research_terms::execute(&ctx, &keyword).unwrap();
        outline::execute(&ctx, &keyword).unwrap();

        let err = execute(&ctx, &keyword).unwrap_err();

        assert!(matches!(err, AppError::ParseError { .. }));
        assert!(!harness.artifacts.paths().iter().any(|p| p.to_string_lossy().contains("phase3_merged_outline")));
    }
}
