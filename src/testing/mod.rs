//! In-memory fakes for every port, plus canned provider payloads.

mod fake_artifact_store;
mod fake_completion;
mod fake_image;
mod fake_research;
pub mod fixtures;

pub use fake_artifact_store::MemoryArtifactStore;
pub use fake_completion::{FAKE_USAGE, FakeCompletionClient};
pub use fake_image::{FakeImageGenerator, FakeQualityAssessor};
pub use fake_research::FakeResearchClient;

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::EmbeddedPromptStore;
use crate::app::{AppContext, Collaborators, PipelineSettings};
use crate::domain::PollPolicy;

/// Fakes wired into an [`AppContext`], kept reachable for assertions.
pub struct Harness {
    pub completion: Arc<FakeCompletionClient>,
    pub research: Arc<FakeResearchClient>,
    pub images: Arc<FakeImageGenerator>,
    pub assessor: Arc<FakeQualityAssessor>,
    pub artifacts: Arc<MemoryArtifactStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            completion: Arc::new(FakeCompletionClient::new()),
            research: Arc::new(FakeResearchClient::new()),
            images: Arc::new(FakeImageGenerator::new()),
            assessor: Arc::new(FakeQualityAssessor::new()),
            artifacts: Arc::new(MemoryArtifactStore::new()),
        }
    }

    /// Settings with instant polling so tests never sleep.
    pub fn settings() -> PipelineSettings {
        PipelineSettings {
            poll: PollPolicy { interval: Duration::ZERO, max_wait: Duration::from_secs(3) },
            ..PipelineSettings::default()
        }
    }

    pub fn context(&self) -> AppContext {
        self.context_with(Self::settings())
    }

    pub fn context_with(&self, settings: PipelineSettings) -> AppContext {
        AppContext::new(
            Collaborators {
                completion: self.completion.clone(),
                research: self.research.clone(),
                images: self.images.clone(),
                assessor: self.assessor.clone(),
                prompts: Arc::new(EmbeddedPromptStore::new()),
                artifacts: self.artifacts.clone(),
            },
            settings,
        )
    }

    /// Total calls made to any external service.
    pub fn external_calls(&self) -> usize {
        self.completion.requests().len()
            + self.research.calls().len()
            + self.images.prompts().len()
            + self.assessor.requests().len()
    }
}
