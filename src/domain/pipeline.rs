use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AppError;

/// Text pipeline phases in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    ResearchTerms,
    GenerateOutline,
    MergeOutlineWithTerms,
    GenerateSectionContent,
    RenderFinal,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::ResearchTerms,
        Phase::GenerateOutline,
        Phase::MergeOutlineWithTerms,
        Phase::GenerateSectionContent,
        Phase::RenderFinal,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Phase::ResearchTerms => 1,
            Phase::GenerateOutline => 2,
            Phase::MergeOutlineWithTerms => 3,
            Phase::GenerateSectionContent => 4,
            Phase::RenderFinal => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::ResearchTerms => "research_terms",
            Phase::GenerateOutline => "generate_outline",
            Phase::MergeOutlineWithTerms => "merge_outline_with_terms",
            Phase::GenerateSectionContent => "generate_section_content",
            Phase::RenderFinal => "render_final",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Steps of the image pipeline, used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStep {
    Describe,
    Generate,
    Assess,
}

impl fmt::Display for ImageStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageStep::Describe => "describe",
            ImageStep::Generate => "generate",
            ImageStep::Assess => "assess",
        })
    }
}

/// First failure of a pipeline run, attributed to where it happened.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct PipelineError {
    pub stage: String,
    #[source]
    pub source: AppError,
}

impl PipelineError {
    pub fn phase(phase: Phase, source: AppError) -> Self {
        Self { stage: phase.name().to_string(), source }
    }

    pub fn image(step: ImageStep, source: AppError) -> Self {
        Self { stage: format!("image_{}", step), source }
    }

    pub fn is_client_error(&self) -> bool {
        self.source.is_client_error()
    }
}

/// Non-fatal degradation recorded on a pipeline report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub source: String,
    pub message: String,
}

impl Warning {
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self { source: source.into(), message: message.into() }
    }
}
