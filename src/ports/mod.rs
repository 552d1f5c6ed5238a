mod artifact_store;
mod completion_client;
mod image_generator;
mod prompt_store;
mod quality_assessor;
mod research_client;

pub use artifact_store::{ArtifactStore, ArtifactStoreExt};
pub use completion_client::{CompletionClient, CompletionOutput, CompletionRequest};
pub use image_generator::ImageGenerator;
pub use prompt_store::PromptStore;
pub use quality_assessor::{AssessmentRequest, QualityAssessor};
pub use research_client::ResearchClient;
