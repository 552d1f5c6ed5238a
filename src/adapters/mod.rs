pub mod artifact_store_filesystem;
pub mod ideogram_http;
pub mod neuronwriter_http;
pub mod openai_http;
pub mod prompt_store_embedded;
pub mod prompt_store_filesystem;

pub use artifact_store_filesystem::FilesystemArtifactStore;
pub use ideogram_http::HttpImageGenerator;
pub use neuronwriter_http::HttpResearchClient;
pub use openai_http::{HttpCompletionClient, HttpVisionClient};
pub use prompt_store_embedded::EmbeddedPromptStore;
pub use prompt_store_filesystem::FilesystemPromptStore;
