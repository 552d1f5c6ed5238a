//! Image generation port definition.

use crate::domain::{AppError, GeneratedImage, StyleParams};

/// Port for the image-generation endpoint.
pub trait ImageGenerator: Send + Sync {
    /// Generate one image. Unsafe results are `GenerationRejected`.
    fn generate(&self, prompt: &str, style: &StyleParams) -> Result<GeneratedImage, AppError>;

    /// Fetch the bytes behind a generated image URL.
    fn download(&self, url: &str) -> Result<Vec<u8>, AppError>;
}
