use std::sync::Arc;

use crate::app::locks::KeywordLocks;
use crate::domain::config::MediaforgeConfig;
use crate::domain::{PlaceholderPolicy, PollPolicy, StyleParams};
use crate::ports::{
    ArtifactStore, CompletionClient, ImageGenerator, PromptStore, QualityAssessor, ResearchClient,
};

/// Tunables the pipelines read at run time.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub poll: PollPolicy,
    pub project_id: Option<String>,
    pub engine: String,
    pub language: String,
    pub reuse_ready_queries: bool,
    pub style: StyleParams,
    pub max_image_attempts: u32,
    pub section_concurrency: usize,
    pub placeholder_policy: PlaceholderPolicy,
}

impl PipelineSettings {
    pub fn from_config(config: &MediaforgeConfig) -> Self {
        Self {
            poll: config.research.poll_policy(),
            project_id: config.research.project_id.clone(),
            engine: config.research.engine.clone(),
            language: config.research.language.clone(),
            reuse_ready_queries: config.research.reuse_ready_queries,
            style: config.image.style(),
            max_image_attempts: config.pipeline.max_image_attempts,
            section_concurrency: config.pipeline.section_concurrency,
            placeholder_policy: config.prompts.placeholder_policy,
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&MediaforgeConfig::default())
    }
}

/// Collaborators for one process, shared by every request.
#[derive(Clone)]
pub struct AppContext {
    completion: Arc<dyn CompletionClient>,
    research: Arc<dyn ResearchClient>,
    images: Arc<dyn ImageGenerator>,
    assessor: Arc<dyn QualityAssessor>,
    prompts: Arc<dyn PromptStore>,
    artifacts: Arc<dyn ArtifactStore>,
    settings: PipelineSettings,
    locks: Arc<KeywordLocks>,
}

/// Port implementations handed to [`AppContext::new`].
pub struct Collaborators {
    pub completion: Arc<dyn CompletionClient>,
    pub research: Arc<dyn ResearchClient>,
    pub images: Arc<dyn ImageGenerator>,
    pub assessor: Arc<dyn QualityAssessor>,
    pub prompts: Arc<dyn PromptStore>,
    pub artifacts: Arc<dyn ArtifactStore>,
}

impl AppContext {
    pub fn new(collaborators: Collaborators, settings: PipelineSettings) -> Self {
        let Collaborators { completion, research, images, assessor, prompts, artifacts } = collaborators;
        Self {
            completion,
            research,
            images,
            assessor,
            prompts,
            artifacts,
            settings,
            locks: Arc::new(KeywordLocks::default()),
        }
    }

    pub fn completion(&self) -> &dyn CompletionClient {
        self.completion.as_ref()
    }

    pub fn research(&self) -> &dyn ResearchClient {
        self.research.as_ref()
    }

    pub fn images(&self) -> &dyn ImageGenerator {
        self.images.as_ref()
    }

    pub fn assessor(&self) -> &dyn QualityAssessor {
        self.assessor.as_ref()
    }

    pub fn prompts(&self) -> &dyn PromptStore {
        self.prompts.as_ref()
    }

    pub fn artifacts(&self) -> &dyn ArtifactStore {
        self.artifacts.as_ref()
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn locks(&self) -> &KeywordLocks {
        &self.locks
    }
}
