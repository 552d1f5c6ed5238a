use std::fmt;

use serde::{Deserialize, Serialize};

use super::AppError;

/// A trimmed, non-empty search keyword that drives one pipeline run.
///
/// Artifacts are keyed by [`Keyword::sanitized`]. Keywords that differ only in
/// case, punctuation, or whitespace share the same artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Keyword(String);

impl Keyword {
    pub fn new(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("keyword is required"));
        }
        if sanitize_keyword(trimmed).is_empty() {
            return Err(AppError::validation(format!(
                "keyword '{}' must contain at least one letter or digit",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem-safe form used in artifact file names.
    pub fn sanitized(&self) -> String {
        sanitize_keyword(&self.0)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Keyword {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Keyword::new(&value)
    }
}

impl From<Keyword> for String {
    fn from(value: Keyword) -> Self {
        value.0
    }
}

/// Lowercase, drop everything outside `[a-z0-9]` and whitespace, join whitespace runs with `_`.
pub fn sanitize_keyword(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("_")
}
