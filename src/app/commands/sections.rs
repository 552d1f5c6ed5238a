//! Phase 4: write every merged section.

use std::thread;
use std::time::Instant;

use tracing::{debug, info};

use crate::app::{AppContext, prompting};
use crate::domain::{
    AppError, ArticleArtifact, ArticleSection, Keyword, MergedOutlineArtifact, PhaseMetadata,
    SectionContent, SectionOutline, SubstitutionContext,
};
use crate::ports::ArtifactStoreExt;

pub const PROMPT: &str = "loop_prompt";

pub fn execute(ctx: &AppContext, keyword: &Keyword) -> Result<ArticleArtifact, AppError> {
    let started = Instant::now();
    let merged: MergedOutlineArtifact = ctx.artifacts().load(keyword)?;
    let concurrency = ctx.settings().section_concurrency.max(1);

    let sections = if concurrency == 1 {
        merged
            .sections
            .iter()
            .map(|section| write_section(ctx, keyword, section))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        write_concurrently(ctx, keyword, &merged.sections, concurrency)?
    };

    let article =
        ArticleArtifact::assemble(keyword.as_str(), sections, started.elapsed().as_millis() as u64);
    info!(
        keyword = %keyword,
        sections = article.metadata.total_sections,
        words = article.metadata.total_word_count,
        "article assembled"
    );
    ctx.artifacts().save(keyword, &article)?;
    Ok(article)
}

/// Up to `limit` sections in flight; results keep outline order and the
/// first failing section (in order) is reported.
fn write_concurrently(
    ctx: &AppContext,
    keyword: &Keyword,
    sections: &[SectionOutline],
    limit: usize,
) -> Result<Vec<ArticleSection>, AppError> {
    let mut written = Vec::with_capacity(sections.len());
    for batch in sections.chunks(limit) {
        let results: Vec<Result<ArticleSection, AppError>> = thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|section| scope.spawn(move || write_section(ctx, keyword, section)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });
        for result in results {
            written.push(result?);
        }
    }
    Ok(written)
}

fn write_section(
    ctx: &AppContext,
    keyword: &Keyword,
    section: &SectionOutline,
) -> Result<ArticleSection, AppError> {
    let started = Instant::now();
    let context = SubstitutionContext::new()
        .with("keyword", keyword.as_str())
        .with("headline", &section.headline)
        .with("description", &section.description)
        .with("header_terms", section.header_terms.join(", "))
        .with("content_terms", section.content_terms.join(", "));

    let output = prompting::complete(ctx, PROMPT, &context)?;
    let content = SectionContent::from_completion(&output.content)?;
    debug!(headline = %section.headline, blocks = content.content.len(), "section written");

    Ok(ArticleSection {
        outline: section.clone(),
        content,
        metadata: PhaseMetadata {
            processing_time_ms: started.elapsed().as_millis() as u64,
            token_usage: Some(output.usage),
        },
    })
}
