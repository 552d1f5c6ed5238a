//! Configuration loaded from `mediaforge.toml`.
//!
//! Every section is optional. API keys never live in the file; they are read
//! from the environment by the adapters.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::AppError;
use super::image::{RenderingSpeed, StyleParams, StyleType};
use super::prompt::PlaceholderPolicy;
use super::research::PollPolicy;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const NEURONWRITER_API_KEY: &str = "NEURONWRITER_API_KEY";
pub const IDEOGRAM_API_KEY: &str = "IDEOGRAM_API_KEY";

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "mediaforge.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaforgeConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub research: ResearchConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl MediaforgeConfig {
    /// Parse and validate TOML text.
    pub fn parse(content: &str) -> Result<Self, AppError> {
        let config: MediaforgeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or defaults when `path` is `None` and the default file is absent.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(CONFIG_FILE_NAME), false),
        };

        if !path.exists() {
            if required {
                return Err(AppError::config_error(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.openai.validate()?;
        self.research.validate()?;
        self.image.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// Chat-completions endpoint.
    #[serde(default = "default_openai_url")]
    pub api_url: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self { api_url: default_openai_url(), timeout_secs: default_llm_timeout() }
    }
}

impl OpenAiConfig {
    pub fn endpoint(&self) -> Result<Url, AppError> {
        parse_url("openai.api_url", &self.api_url)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.endpoint()?;
        positive("openai.timeout_secs", self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResearchConfig {
    /// Base URL; endpoint names are appended to it.
    #[serde(default = "default_research_url")]
    pub base_url: String,
    /// Project to create queries in. The first listed project when unset.
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_engine")]
    pub engine: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_wait")]
    pub max_wait_secs: u64,
    #[serde(default = "default_research_timeout")]
    pub timeout_secs: u64,
    /// Reuse a ready query for the same keyword instead of creating one.
    #[serde(default = "default_true")]
    pub reuse_ready_queries: bool,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_research_url(),
            project_id: None,
            engine: default_engine(),
            language: default_language(),
            poll_interval_secs: default_poll_interval(),
            max_wait_secs: default_max_wait(),
            timeout_secs: default_research_timeout(),
            reuse_ready_queries: true,
        }
    }
}

impl ResearchConfig {
    pub fn endpoint(&self) -> Result<Url, AppError> {
        parse_url("research.base_url", &self.base_url)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_wait: Duration::from_secs(self.max_wait_secs),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.endpoint()?;
        positive("research.poll_interval_secs", self.poll_interval_secs)?;
        positive("research.max_wait_secs", self.max_wait_secs)?;
        positive("research.timeout_secs", self.timeout_secs)?;
        if self.engine.trim().is_empty() || self.language.trim().is_empty() {
            return Err(AppError::config_error("research.engine and research.language must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageConfig {
    #[serde(default = "default_image_url")]
    pub api_url: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub rendering_speed: RenderingSpeed,
    #[serde(default)]
    pub style_type: StyleType,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            api_url: default_image_url(),
            timeout_secs: default_llm_timeout(),
            resolution: None,
            aspect_ratio: default_aspect_ratio(),
            rendering_speed: RenderingSpeed::default(),
            style_type: StyleType::default(),
        }
    }
}

impl ImageConfig {
    pub fn endpoint(&self) -> Result<Url, AppError> {
        parse_url("image.api_url", &self.api_url)
    }

    /// A configured resolution takes precedence over the aspect ratio.
    pub fn style(&self) -> StyleParams {
        let aspect_ratio = if self.resolution.is_some() { None } else { self.aspect_ratio.clone() };
        StyleParams {
            resolution: self.resolution.clone(),
            aspect_ratio,
            rendering_speed: self.rendering_speed,
            style_type: self.style_type,
            num_images: 1,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.endpoint()?;
        positive("image.timeout_secs", self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Total image attempts, including the first.
    #[serde(default = "default_max_image_attempts")]
    pub max_image_attempts: u32,
    /// Sections generated concurrently in phase 4.
    #[serde(default = "default_section_concurrency")]
    pub section_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_image_attempts: default_max_image_attempts(),
            section_concurrency: default_section_concurrency(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=MAX_IMAGE_ATTEMPTS_CEILING).contains(&self.max_image_attempts) {
            return Err(AppError::config_error(format!(
                "pipeline.max_image_attempts must be between 1 and {}",
                MAX_IMAGE_ATTEMPTS_CEILING
            )));
        }
        positive("pipeline.section_concurrency", self.section_concurrency as u64)
    }
}

const MAX_IMAGE_ATTEMPTS_CEILING: u32 = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptsConfig {
    /// Directory of `<name>.json` prompt files overriding the built-in set.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub placeholder_policy: PlaceholderPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { artifacts_dir: default_artifacts_dir() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, AppError> {
    Url::parse(raw).map_err(|e| AppError::config_error(format!("{} is not a valid URL: {}", field, e)))
}

fn positive(field: &str, value: u64) -> Result<(), AppError> {
    if value == 0 {
        return Err(AppError::config_error(format!("{} must be greater than 0", field)));
    }
    Ok(())
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_research_url() -> String {
    "https://app.neuronwriter.com/neuron-api/0.5/writer".to_string()
}

fn default_image_url() -> String {
    "https://api.ideogram.ai/v1/ideogram-v3/generate".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_research_timeout() -> u64 {
    30
}

fn default_engine() -> String {
    "google.com".to_string()
}

fn default_language() -> String {
    "English".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_max_wait() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_aspect_ratio() -> Option<String> {
    Some("16x9".to_string())
}

fn default_max_image_attempts() -> u32 {
    2
}

fn default_section_concurrency() -> usize {
    1
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}
