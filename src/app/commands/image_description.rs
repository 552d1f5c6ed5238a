//! Four-step image description chain.

use tracing::{debug, info};

use crate::app::{AppContext, prompting};
use crate::domain::image::{ConceptIdeas, ConceptRating, ConceptRefinement, FinalImagePrompt, parse_step};
use crate::domain::{AppError, ImageDescription, Keyword, SubstitutionContext};

pub const STEP_PROMPTS: [&str; 4] =
    ["step1_idea_generation", "step2_rating", "step3_entities", "step4_final_prompt"];

/// Run the chain once. `feedback` is empty on the first attempt.
pub fn describe(ctx: &AppContext, keyword: &Keyword, feedback: &str) -> Result<ImageDescription, AppError> {
    let base = SubstitutionContext::new().with("keyword", keyword.as_str());

    let ideas: ConceptIdeas = step(ctx, "step1", STEP_PROMPTS[0], base.clone().with("feedback", feedback))?;
    if ideas.concepts.is_empty() {
        return Err(AppError::parse("image step1 reply", "no concepts returned"));
    }

    let rating: ConceptRating =
        step(ctx, "step2", STEP_PROMPTS[1], base.clone().with("concepts", prompting::pretty(&ideas.concepts)?))?;

    let refinement: ConceptRefinement = step(
        ctx,
        "step3",
        STEP_PROMPTS[2],
        base.clone().with("best_concept", prompting::pretty(&rating.best_concept)?),
    )?;

    let final_prompt: FinalImagePrompt = step(
        ctx,
        "step4",
        STEP_PROMPTS[3],
        base.with("optimized_concept", prompting::pretty(&refinement.optimized_concept)?)
            .with("required_entities", prompting::pretty(&refinement.required_entities)?)
            .with("domain_validation", prompting::pretty(&refinement.domain_validation)?)
            .with("feedback", feedback),
    )?;

    let description = final_prompt.prompt_text()?;
    let title = match final_prompt.image_title.trim() {
        "" => keyword.as_str().to_string(),
        title => title.to_string(),
    };
    info!(keyword = %keyword, title = %title, with_feedback = !feedback.is_empty(), "image description ready");

    Ok(ImageDescription { ideas, rating, refinement, final_prompt, description, title })
}

fn step<T: for<'de> serde::Deserialize<'de>>(
    ctx: &AppContext,
    label: &str,
    prompt: &str,
    context: SubstitutionContext,
) -> Result<T, AppError> {
    let output = prompting::complete(ctx, prompt, &context)?;
    debug!(step = label, tokens = output.usage.total_tokens, "description step completed");
    parse_step(label, &output.content)
}
