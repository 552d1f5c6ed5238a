pub mod article;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod image;
pub mod keyword;
pub mod outline;
pub mod pipeline;
pub mod prompt;
pub mod quality;
pub mod render;
pub mod research;
pub mod terms;

pub use article::{ContentBlock, SectionContent};
pub use artifacts::{
    ArticleArtifact, ArticleSection, ArtifactKind, JsonArtifact, MergedOutlineArtifact,
    OutlineArtifact, PhaseMetadata, TermsArtifact, TokenUsage,
};
pub use config::MediaforgeConfig;
pub use error::AppError;
pub use image::{GeneratedImage, ImageDescription, ImageOutcome, RerunInfo, StyleParams};
pub use keyword::Keyword;
pub use outline::{Outline, OutlineSection, SectionOutline};
pub use pipeline::{ImageStep, Phase, PipelineError, Warning};
pub use prompt::{
    OutputSchema, PlaceholderPolicy, PromptTemplate, RenderedPrompt, SamplingParams,
    SubstitutionContext,
};
pub use quality::{QualityAssessment, Verdict};
pub use research::{NewQuery, PollPolicy, QueryHandle, QuerySnapshot, QueryStatus, QuerySummary, ResearchProject};
pub use terms::{ResearchTerms, StructuredTerm};
