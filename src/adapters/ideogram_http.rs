//! Ideogram v3 image generation client.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::multipart::Form;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::domain::config::{IDEOGRAM_API_KEY, ImageConfig};
use crate::domain::{AppError, GeneratedImage, StyleParams};
use crate::ports::ImageGenerator;

const SERVICE: &str = "Ideogram";

#[derive(Clone)]
pub struct HttpImageGenerator {
    api_key: Option<String>,
    api_url: Url,
    client: Client,
}

impl std::fmt::Debug for HttpImageGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpImageGenerator")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpImageGenerator {
    pub fn new(api_key: Option<String>, config: &ImageConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { api_key, api_url: config.endpoint()?, client })
    }

    pub fn from_env_with_config(config: &ImageConfig) -> Result<Self, AppError> {
        let key = std::env::var(IDEOGRAM_API_KEY)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self::new(key, config)
    }
}

fn style_form(prompt: &str, style: &StyleParams) -> Form {
    let mut form = Form::new()
        .text("prompt", prompt.to_string())
        .text("rendering_speed", enum_text(&style.rendering_speed))
        .text("style_type", enum_text(&style.style_type))
        .text("num_images", style.num_images.to_string());
    if let Some(resolution) = &style.resolution {
        form = form.text("resolution", resolution.clone());
    } else if let Some(aspect_ratio) = &style.aspect_ratio {
        form = form.text("aspect_ratio", aspect_ratio.clone());
    }
    form
}

/// Wire name of a serde unit enum (`"REALISTIC"`).
fn enum_text<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

impl ImageGenerator for HttpImageGenerator {
    fn generate(&self, prompt: &str, style: &StyleParams) -> Result<GeneratedImage, AppError> {
        let api_key = self.api_key.as_deref().ok_or(AppError::MissingCredential(IDEOGRAM_API_KEY))?;

        debug!(prompt_chars = prompt.len(), "requesting image generation");
        let response = self
            .client
            .post(self.api_url.clone())
            .header("Api-Key", api_key)
            .multipart(style_form(prompt, style))
            .send()
            .map_err(|e| AppError::Transport { service: SERVICE, status: None, message: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Transport {
                service: SERVICE,
                status: Some(status.as_u16()),
                message: error_text.trim().to_string(),
            });
        }

        let reply: GenerateResponse =
            response.json().map_err(|e| AppError::parse("Ideogram response", e))?;
        let first = reply
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AppError::EmptyResponse { service: SERVICE, what: "image data".into() })?;

        if !first.is_image_safe {
            return Err(AppError::GenerationRejected("image flagged as unsafe".into()));
        }
        let image_url = first
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::EmptyResponse { service: SERVICE, what: "image url".into() })?;

        info!(seed = first.seed, resolution = %first.resolution, "image generated");
        Ok(GeneratedImage {
            image_url,
            resolution: first.resolution,
            seed: first.seed,
            is_image_safe: first.is_image_safe,
            style_type: first.style_type,
            created: reply.created,
        })
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::Transport { service: SERVICE, status: None, message: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport {
                service: SERVICE,
                status: Some(status.as_u16()),
                message: format!("image download failed for {}", url),
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| AppError::Transport { service: SERVICE, status: None, message: e.to_string() })?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    created: String,
    #[serde(default)]
    data: Vec<ImageObject>,
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    resolution: String,
    #[serde(default)]
    seed: u64,
    #[serde(default)]
    is_image_safe: bool,
    #[serde(default)]
    style_type: String,
}
