//! Image pipeline: describe, generate, assess, and retry with feedback.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::app::AppContext;
use crate::app::commands::image_description;
use crate::domain::quality::{DEFAULT_QUALITY_CRITERIA, image_title};
use crate::domain::{
    AppError, GeneratedImage, ImageDescription, ImageOutcome, ImageStep, Keyword, PipelineError,
    QualityAssessment, RerunInfo, SubstitutionContext, Warning,
};
use crate::ports::AssessmentRequest;

pub const QUALITY_PROMPT: &str = "image_quality_prompt";

#[derive(Debug, Clone, Default)]
pub struct ImageOptions {
    /// Echoed back; one image is produced per run.
    pub count: Option<u32>,
    /// Download the final image and write debug side files.
    pub debug: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageMediaReport {
    #[serde(flatten)]
    pub outcome: ImageOutcome,
    pub warnings: Vec<Warning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_count: Option<u32>,
}

struct Attempt {
    description: ImageDescription,
    image: GeneratedImage,
    assessment: QualityAssessment,
}

pub fn execute(
    ctx: &AppContext,
    keyword: &Keyword,
    options: &ImageOptions,
) -> Result<ImageMediaReport, PipelineError> {
    let started = Instant::now();
    let max_attempts = ctx.settings().max_image_attempts.max(1);
    let mut warnings = Vec::new();
    let mut feedback = String::new();
    let mut attempts_used = 1;

    let last = loop {
        let attempt = run_attempt(ctx, keyword, &feedback)?;
        if options.debug {
            write_debug(ctx, keyword, &format!("description_attempt{}", attempts_used), &attempt.description, &mut warnings);
            write_debug(ctx, keyword, &format!("assessment_attempt{}", attempts_used), &attempt.assessment, &mut warnings);
        }

        if attempt.assessment.passed() {
            info!(keyword = %keyword, attempt = attempts_used, "image passed quality review");
            break attempt;
        }
        if attempts_used >= max_attempts {
            warn!(keyword = %keyword, attempts = attempts_used, "image failed quality review, keeping last attempt");
            break attempt;
        }

        feedback = attempt.assessment.feedback();
        warn!(keyword = %keyword, attempt = attempts_used, feedback = %feedback, "image failed quality review, retrying");
        attempts_used += 1;
    };

    let saved_image_path = if options.debug {
        save_image(ctx, keyword, &last.image.image_url, attempts_used, &mut warnings)
    } else {
        None
    };

    let attempted = attempts_used > 1;
    let outcome = ImageOutcome {
        keyword: keyword.as_str().to_string(),
        description: last.description.description,
        title: last.description.title,
        image: last.image,
        quality_assessment: Some(last.assessment),
        rerun: RerunInfo { attempted, attempts_used, feedback_applied: attempted.then_some(feedback) },
        saved_image_path,
        processing_time_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        keyword = %keyword,
        attempts = attempts_used,
        duration_ms = outcome.processing_time_ms,
        "image pipeline completed"
    );

    Ok(ImageMediaReport { outcome, warnings, image_count: options.count })
}

fn run_attempt(ctx: &AppContext, keyword: &Keyword, feedback: &str) -> Result<Attempt, PipelineError> {
    let description = image_description::describe(ctx, keyword, feedback)
        .map_err(|e| PipelineError::image(ImageStep::Describe, e))?;
    let image = ctx
        .images()
        .generate(&description.description, &ctx.settings().style)
        .map_err(|e| PipelineError::image(ImageStep::Generate, e))?;
    let assessment =
        assess(ctx, keyword, &image.image_url).map_err(|e| PipelineError::image(ImageStep::Assess, e))?;
    Ok(Attempt { description, image, assessment })
}

/// Grade one image with the quality prompt's rubric.
pub fn assess(ctx: &AppContext, keyword: &Keyword, image_url: &str) -> Result<QualityAssessment, AppError> {
    let template = ctx.prompts().load(QUALITY_PROMPT)?;
    let rubric = template.quality_criteria().unwrap_or(DEFAULT_QUALITY_CRITERIA).to_string();
    let context = SubstitutionContext::new()
        .with("image_title", image_title(image_url, keyword.as_str()))
        .with("keyword", keyword.as_str())
        .with("quality_criteria", rubric);
    let prompt = template.render(&context, ctx.settings().placeholder_policy)?;

    ctx.assessor().assess(AssessmentRequest {
        sampling: template.sampling,
        prompt,
        image_url: image_url.to_string(),
    })
}

fn save_image(
    ctx: &AppContext,
    keyword: &Keyword,
    url: &str,
    attempt: u32,
    warnings: &mut Vec<Warning>,
) -> Option<String> {
    let name = format!("{}_{}.png", keyword.sanitized(), attempt);
    let saved = ctx
        .images()
        .download(url)
        .and_then(|bytes| ctx.artifacts().write_side_file("images", &name, &bytes));
    match saved {
        Ok(path) => Some(path.display().to_string()),
        Err(e) => {
            warn!(keyword = %keyword, error = %e, "image download failed");
            warnings.push(Warning::new("image_download", e.to_string()));
            None
        }
    }
}

fn write_debug<T: Serialize>(
    ctx: &AppContext,
    keyword: &Keyword,
    name: &str,
    value: &T,
    warnings: &mut Vec<Warning>,
) {
    let file = format!("{}_{}.json", keyword.sanitized(), name);
    let written = serde_json::to_vec_pretty(value)
        .map_err(|e| AppError::parse(name, e))
        .and_then(|bytes| ctx.artifacts().write_side_file("debug", &file, &bytes));
    if let Err(e) = written {
        warn!(file = %file, error = %e, "debug file not written");
        warnings.push(Warning::new("debug_file", format!("{}: {}", file, e)));
    }
}
