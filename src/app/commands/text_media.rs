//! Five-phase text pipeline for one keyword.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};

use crate::app::AppContext;
use crate::app::commands::{merge, outline, render, research_terms, sections};
use crate::domain::{AppError, ArtifactKind, Keyword, Phase, PipelineError, TokenUsage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseReport {
    pub status: &'static str,
    pub time: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputFiles {
    pub terms: String,
    pub outline: String,
    pub merged: String,
    pub content: String,
    #[serde(rename = "final")]
    pub final_markdown: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentSummary {
    pub sections: usize,
    pub word_count: usize,
    pub content_blocks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextMediaReport {
    pub keyword: String,
    pub processing_time: u64,
    pub phases: BTreeMap<String, PhaseReport>,
    pub output_files: OutputFiles,
    pub content_summary: ContentSummary,
    pub token_usage: TokenUsage,
}

/// Run phases 1 through 5, stopping at the first failure.
pub fn execute(ctx: &AppContext, keyword: &Keyword) -> Result<TextMediaReport, PipelineError> {
    let started = Instant::now();
    let mut phases = BTreeMap::new();

    run_phase(Phase::ResearchTerms, keyword, &mut phases, || research_terms::execute(ctx, keyword))?;
    let outline = run_phase(Phase::GenerateOutline, keyword, &mut phases, || outline::execute(ctx, keyword))?;
    let merged = run_phase(Phase::MergeOutlineWithTerms, keyword, &mut phases, || merge::execute(ctx, keyword))?;
    let article =
        run_phase(Phase::GenerateSectionContent, keyword, &mut phases, || sections::execute(ctx, keyword))?;
    let rendered = run_phase(Phase::RenderFinal, keyword, &mut phases, || render::execute(ctx, keyword))?;

    let token_usage = [outline.metadata.token_usage, merged.metadata.token_usage]
        .into_iter()
        .flatten()
        .sum::<TokenUsage>()
        + article.metadata.token_usage;

    let locate = |kind| ctx.artifacts().locate(kind, keyword).display().to_string();
    let report = TextMediaReport {
        keyword: keyword.as_str().to_string(),
        processing_time: started.elapsed().as_millis() as u64,
        phases,
        output_files: OutputFiles {
            terms: locate(ArtifactKind::Terms),
            outline: locate(ArtifactKind::Outline),
            merged: locate(ArtifactKind::MergedOutline),
            content: locate(ArtifactKind::Article),
            final_markdown: rendered.path.display().to_string(),
        },
        content_summary: ContentSummary {
            sections: article.metadata.total_sections,
            word_count: article.metadata.total_word_count,
            content_blocks: article.metadata.total_content_blocks,
        },
        token_usage,
    };
    info!(keyword = %keyword, duration_ms = report.processing_time, "text pipeline completed");
    Ok(report)
}

fn run_phase<T>(
    phase: Phase,
    keyword: &Keyword,
    phases: &mut BTreeMap<String, PhaseReport>,
    run: impl FnOnce() -> Result<T, AppError>,
) -> Result<T, PipelineError> {
    info!(keyword = %keyword, phase = %phase, "phase started");
    let started = Instant::now();
    match run() {
        Ok(value) => {
            let duration_ms = started.elapsed().as_millis() as u64;
            info!(keyword = %keyword, phase = %phase, duration_ms, "phase completed");
            phases.insert(format!("phase{}", phase.number()), PhaseReport { status: "completed", time: duration_ms });
            Ok(value)
        }
        Err(source) => {
            error!(keyword = %keyword, phase = %phase, error = %source, "phase failed");
            Err(PipelineError::phase(phase, source))
        }
    }
}
