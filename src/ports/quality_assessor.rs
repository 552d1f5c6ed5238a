//! Vision quality-assessment port definition.

use crate::domain::{AppError, QualityAssessment, RenderedPrompt, SamplingParams};

/// A rubric prompt plus the image it applies to.
#[derive(Debug, Clone)]
pub struct AssessmentRequest {
    pub sampling: SamplingParams,
    pub prompt: RenderedPrompt,
    pub image_url: String,
}

/// Port for the vision-capable model that grades generated images.
pub trait QualityAssessor: Send + Sync {
    fn assess(&self, request: AssessmentRequest) -> Result<QualityAssessment, AppError>;
}
