//! Phase artifacts persisted between pipeline phases.

use std::ops::{Add, AddAssign};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::article::SectionContent;
use super::outline::{Outline, SectionOutline};
use super::terms::{BodyTermSet, Competitor, Entity, HeadingTermSet, Questions};

/// Token accounting reported by the completion endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: TokenUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens + rhs.prompt_tokens,
            completion_tokens: self.completion_tokens + rhs.completion_tokens,
            total_tokens: self.total_tokens + rhs.total_tokens,
        }
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: TokenUsage) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for TokenUsage {
    fn sum<I: Iterator<Item = TokenUsage>>(iter: I) -> Self {
        iter.fold(TokenUsage::default(), Add::add)
    }
}

/// Storage location kinds, one per artifact bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Terms,
    Outline,
    MergedOutline,
    Article,
    FinalMarkdown,
}

impl ArtifactKind {
    /// Path relative to the artifact root for a sanitized keyword.
    pub fn relative_path(&self, sanitized: &str) -> PathBuf {
        match self {
            ArtifactKind::Terms => PathBuf::from("optimization_terms").join(format!("{}.json", sanitized)),
            ArtifactKind::Outline => {
                PathBuf::from("outlines").join(format!("phase2_outline_{}.json", sanitized))
            }
            ArtifactKind::MergedOutline => {
                PathBuf::from("outlines").join(format!("phase3_merged_outline_{}.json", sanitized))
            }
            ArtifactKind::Article => {
                PathBuf::from("articles").join(format!("phase4_article_{}.json", sanitized))
            }
            ArtifactKind::FinalMarkdown => {
                PathBuf::from("final").join(format!("phase5_article_{}.md", sanitized))
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Terms => "optimization terms",
            ArtifactKind::Outline => "outline",
            ArtifactKind::MergedOutline => "merged outline",
            ArtifactKind::Article => "article",
            ArtifactKind::FinalMarkdown => "final article",
        }
    }
}

/// Typed JSON artifact with a fixed storage kind.
pub trait JsonArtifact: Serialize + for<'de> Deserialize<'de> {
    const KIND: ArtifactKind;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseMetadata {
    pub processing_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}

/// Phase 1 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsArtifact {
    pub keyword: String,
    pub query_id: String,
    #[serde(default)]
    pub query_url: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default = "phase_one")]
    pub phase: u8,
    pub headings: HeadingTermSet,
    pub body_terms: BodyTermSet,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub questions: Questions,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub metadata: PhaseMetadata,
}

fn phase_one() -> u8 {
    1
}

impl JsonArtifact for TermsArtifact {
    const KIND: ArtifactKind = ArtifactKind::Terms;
}

/// Phase 2 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineArtifact {
    pub keyword: String,
    pub generated_at: DateTime<Utc>,
    pub phase: u8,
    pub outline: Outline,
    pub metadata: PhaseMetadata,
}

impl JsonArtifact for OutlineArtifact {
    const KIND: ArtifactKind = ArtifactKind::Outline;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeMetadata {
    pub processing_time_ms: u64,
    pub body_terms_used: usize,
    pub original_sections: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}

/// Phase 3 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedOutlineArtifact {
    pub keyword: String,
    pub generated_at: DateTime<Utc>,
    pub phase: u8,
    pub sections: Vec<SectionOutline>,
    pub metadata: MergeMetadata,
}

impl JsonArtifact for MergedOutlineArtifact {
    const KIND: ArtifactKind = ArtifactKind::MergedOutline;
}

/// A merged outline section together with its generated body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSection {
    #[serde(flatten)]
    pub outline: SectionOutline,
    pub content: SectionContent,
    pub metadata: PhaseMetadata,
}

impl ArticleSection {
    /// Heading shown for the section: generated headline, else the outline's.
    pub fn display_headline(&self) -> &str {
        let generated = self.content.headline.trim();
        if generated.is_empty() { self.outline.headline.trim() } else { generated }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    pub processing_time_ms: u64,
    pub total_sections: usize,
    pub total_word_count: usize,
    pub total_content_blocks: usize,
    #[serde(default)]
    pub token_usage: TokenUsage,
}

/// Phase 4 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleArtifact {
    pub keyword: String,
    pub generated_at: DateTime<Utc>,
    pub phase: u8,
    pub sections: Vec<ArticleSection>,
    pub metadata: ArticleMetadata,
}

impl ArticleArtifact {
    /// Assemble the article and compute its totals.
    pub fn assemble(keyword: &str, sections: Vec<ArticleSection>, processing_time_ms: u64) -> Self {
        let metadata = ArticleMetadata {
            processing_time_ms,
            total_sections: sections.len(),
            total_word_count: sections.iter().map(|s| s.content.word_count()).sum(),
            total_content_blocks: sections.iter().map(|s| s.content.content.len()).sum(),
            token_usage: sections.iter().filter_map(|s| s.metadata.token_usage).sum(),
        };
        Self { keyword: keyword.to_string(), generated_at: Utc::now(), phase: 4, sections, metadata }
    }
}

impl JsonArtifact for ArticleArtifact {
    const KIND: ArtifactKind = ArtifactKind::Article;
}
