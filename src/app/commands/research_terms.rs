//! Phase 1: keyword research through the SEO provider.

use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info};

use crate::app::AppContext;
use crate::domain::research::same_keyword;
use crate::domain::terms::extract_structured_terms;
use crate::domain::{
    AppError, Keyword, NewQuery, PhaseMetadata, PollPolicy, QuerySnapshot, QueryStatus,
    TermsArtifact,
};
use crate::ports::{ArtifactStoreExt, ResearchClient};

pub fn execute(ctx: &AppContext, keyword: &Keyword) -> Result<TermsArtifact, AppError> {
    let started = Instant::now();
    let settings = ctx.settings();
    let research = ctx.research();

    let project = resolve_project(ctx)?;
    let reused = if settings.reuse_ready_queries {
        research
            .list_queries(&project)?
            .into_iter()
            .find(|q| q.status == Some(QueryStatus::Ready) && same_keyword(&q.keyword, keyword.as_str()))
    } else {
        None
    };

    let (query_id, mut query_url) = match reused {
        Some(existing) => {
            info!(keyword = %keyword, query_id = %existing.query_id, "reusing ready research query");
            (existing.query_id, String::new())
        }
        None => {
            let handle = research.create_query(&NewQuery {
                project,
                keyword: keyword.as_str().to_string(),
                engine: settings.engine.clone(),
                language: settings.language.clone(),
            })?;
            info!(keyword = %keyword, query_id = %handle.query_id, "research query created");
            (handle.query_id, handle.query_url)
        }
    };

    let snapshot = poll_until_ready(research, &query_id, settings.poll, std::thread::sleep)?;
    if query_url.is_empty() {
        query_url = snapshot.query_url.clone().unwrap_or_default();
    }

    let terms = extract_structured_terms(&snapshot.raw);
    let artifact = TermsArtifact {
        keyword: keyword.as_str().to_string(),
        query_id,
        query_url,
        generated_at: Utc::now(),
        phase: 1,
        headings: terms.headings,
        body_terms: terms.body_terms,
        entities: terms.entities,
        questions: terms.questions,
        competitors: terms.competitors,
        metadata: PhaseMetadata { processing_time_ms: started.elapsed().as_millis() as u64, token_usage: None },
    };
    ctx.artifacts().save(keyword, &artifact)?;
    Ok(artifact)
}

/// Configured project, else the first one the provider lists.
fn resolve_project(ctx: &AppContext) -> Result<String, AppError> {
    if let Some(project) = ctx.settings().project_id.as_deref().map(str::trim)
        && !project.is_empty()
    {
        return Ok(project.to_string());
    }
    ctx.research()
        .list_projects()?
        .into_iter()
        .next()
        .map(|p| p.id)
        .ok_or_else(|| AppError::validation("No research projects found"))
}

/// Poll `get_query` at a fixed interval until the query is ready or
/// `policy.max_wait` of wall-clock time has passed.
pub fn poll_until_ready(
    research: &dyn ResearchClient,
    query_id: &str,
    policy: PollPolicy,
    sleep: impl Fn(Duration),
) -> Result<QuerySnapshot, AppError> {
    let started = Instant::now();
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let snapshot = research.get_query(query_id)?;
        match snapshot.status {
            QueryStatus::Ready => return Ok(snapshot),
            QueryStatus::NotFound => return Err(AppError::QueryNotFound(query_id.to_string())),
            status => debug!(query_id, ?status, attempt, "research query not ready"),
        }

        let elapsed = started.elapsed();
        if elapsed >= policy.max_wait {
            return Err(AppError::Timeout { query_id: query_id.to_string(), waited_secs: elapsed.as_secs() });
        }
        sleep(policy.interval.min(policy.max_wait - elapsed));
    }
}
