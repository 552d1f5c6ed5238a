use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Library-wide error type for mediaforge operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Configuration or environment issue.
    #[error("{0}")]
    Configuration(String),

    /// Caller input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Required API key is not present in the environment.
    #[error("{0} environment variable not set")]
    MissingCredential(&'static str),

    /// Network failure or non-success HTTP status from an external service.
    #[error("{service} request failed{}: {message}", status_suffix(.status))]
    Transport { service: &'static str, status: Option<u16>, message: String },

    /// External service answered successfully but without usable content.
    #[error("{service} returned no {what}")]
    EmptyResponse { service: &'static str, what: String },

    /// Vision reply could not be turned into a quality verdict.
    #[error("Malformed quality assessment: {0}")]
    MalformedAssessment(String),

    /// Parse error.
    #[error("Failed to parse {what}: {details}")]
    ParseError { what: String, details: String },

    /// A prior phase artifact is missing on disk.
    #[error("Artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    /// Research query did not become ready in time.
    #[error("Research query '{query_id}' not ready after {waited_secs}s")]
    Timeout { query_id: String, waited_secs: u64 },

    /// Research query id is unknown to the provider.
    #[error("Research query '{0}' not found")]
    QueryNotFound(String),

    /// Image reference is not an absolute http(s) URL.
    #[error("Invalid image reference '{0}': must be an absolute http(s) URL")]
    InvalidImageReference(String),

    /// Image provider flagged the result as unsafe.
    #[error("Image generation rejected: {0}")]
    GenerationRejected(String),

    /// Prompt template not found by name.
    #[error("Prompt '{0}' not found")]
    PromptNotFound(String),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),
}

impl AppError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    pub fn parse<W: Into<String>, D: ToString>(what: W, details: D) -> Self {
        AppError::ParseError { what: what.into(), details: details.to_string() }
    }

    /// True when the failure was caused by the caller's input rather than a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::PromptNotFound(_)
                | AppError::InvalidImageReference(_)
        )
    }

    /// Stable machine-readable code used in error response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Io(_) => "IO_ERROR",
            AppError::Configuration(_) | AppError::TomlParseError(_) => "CONFIGURATION_ERROR",
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::MissingCredential(_) => "MISSING_CREDENTIAL",
            AppError::Transport { .. } => "TRANSPORT_FAILED",
            AppError::EmptyResponse { .. } => "EMPTY_RESPONSE",
            AppError::MalformedAssessment(_) => "MALFORMED_ASSESSMENT",
            AppError::ParseError { .. } => "PARSE_FAILED",
            AppError::ArtifactNotFound(_) => "ARTIFACT_NOT_FOUND",
            AppError::Timeout { .. } => "TIMEOUT",
            AppError::QueryNotFound(_) => "QUERY_NOT_FOUND",
            AppError::InvalidImageReference(_) => "INVALID_IMAGE_REFERENCE",
            AppError::GenerationRejected(_) => "GENERATION_REJECTED",
            AppError::PromptNotFound(_) => "PROMPT_NOT_FOUND",
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}
