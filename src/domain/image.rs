//! Image description, generation, and retry bookkeeping types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AppError;
use super::quality::QualityAssessment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RenderingSpeed {
    Turbo,
    #[default]
    Default,
    Quality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StyleType {
    General,
    #[default]
    Realistic,
    Design,
    Fiction,
}

/// Generation options forwarded to the image endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub rendering_speed: RenderingSpeed,
    #[serde(default)]
    pub style_type: StyleType,
    #[serde(default = "one")]
    pub num_images: u8,
}

fn one() -> u8 {
    1
}

/// First image returned by the generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub image_url: String,
    #[serde(default)]
    pub resolution: String,
    #[serde(default)]
    pub seed: u64,
    pub is_image_safe: bool,
    #[serde(default)]
    pub style_type: String,
    #[serde(default)]
    pub created: String,
}

/// Candidate visual concept from step 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageConcept {
    #[serde(default)]
    pub id: Value,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub key_elements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptIdeas {
    pub concepts: Vec<ImageConcept>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptRating {
    #[serde(default)]
    pub ratings: Vec<Value>,
    pub best_concept: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptRefinement {
    #[serde(default)]
    pub required_entities: Value,
    #[serde(default)]
    pub domain_validation: Value,
    pub optimized_concept: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalImagePrompt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_prompt: Option<Value>,
    #[serde(default)]
    pub image_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_analysis: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_checks: Option<Value>,
}

impl FinalImagePrompt {
    /// Prompt text sent to the image endpoint.
    pub fn prompt_text(&self) -> Result<String, AppError> {
        if let Some(description) = self.image_description.as_deref().map(str::trim)
            && !description.is_empty()
        {
            return Ok(description.to_string());
        }
        match &self.structured_prompt {
            Some(prompt) if !prompt.is_null() => serde_json::to_string(prompt)
                .map_err(|e| AppError::parse("structured image prompt", e)),
            _ => Err(AppError::parse(
                "final image prompt",
                "neither image_description nor structured_prompt present",
            )),
        }
    }
}

/// Parse a step reply, naming the step in errors.
pub fn parse_step<T: for<'de> Deserialize<'de>>(step: &str, content: &str) -> Result<T, AppError> {
    serde_json::from_str(content).map_err(|e| AppError::parse(format!("image {} reply", step), e))
}

/// Outcome of the four-step description chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescription {
    pub ideas: ConceptIdeas,
    pub rating: ConceptRating,
    pub refinement: ConceptRefinement,
    pub final_prompt: FinalImagePrompt,
    pub description: String,
    pub title: String,
}

/// Retry bookkeeping reported with the image result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RerunInfo {
    pub attempted: bool,
    pub attempts_used: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_applied: Option<String>,
}

/// Final result of the image pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageOutcome {
    pub keyword: String,
    pub description: String,
    pub title: String,
    pub image: GeneratedImage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_assessment: Option<QualityAssessment>,
    pub rerun: RerunInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_image_path: Option<String>,
    pub processing_time_ms: u64,
}
