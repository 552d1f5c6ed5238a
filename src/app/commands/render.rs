//! Phase 5: Markdown from the assembled article.

use std::path::PathBuf;

use tracing::info;

use crate::app::AppContext;
use crate::domain::render::render_markdown;
use crate::domain::{AppError, ArticleArtifact, ArtifactKind, Keyword};
use crate::ports::ArtifactStoreExt;

#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub path: PathBuf,
    pub markdown: String,
}

pub fn execute(ctx: &AppContext, keyword: &Keyword) -> Result<RenderOutcome, AppError> {
    let article: ArticleArtifact = ctx.artifacts().load(keyword)?;
    let markdown = render_markdown(&article)?;
    let path = ctx.artifacts().write_text(ArtifactKind::FinalMarkdown, keyword, &markdown)?;
    info!(keyword = %keyword, path = %path.display(), "article rendered");
    Ok(RenderOutcome { path, markdown })
}
