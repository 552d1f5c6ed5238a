use serde::{Deserialize, Serialize};

use super::AppError;

/// Outline entry produced by phase 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSection {
    pub header: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub sections: Vec<OutlineSection>,
}

impl Outline {
    /// Parse the completion output. `sections` must be a non-empty array.
    pub fn from_completion(content: &str) -> Result<Self, AppError> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| AppError::parse("outline", e))?;
        match value.get("sections") {
            Some(serde_json::Value::Array(items)) if items.is_empty() => {
                return Err(AppError::parse("outline", "no sections"));
            }
            Some(serde_json::Value::Array(_)) => {}
            _ => return Err(AppError::parse("outline", "sections is not an array")),
        }
        serde_json::from_value(value).map_err(|e| AppError::parse("outline", e))
    }

    /// `N. header: description` lines for the merge prompt.
    pub fn numbered(&self) -> String {
        self.sections
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}: {}", i + 1, s.header, s.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Outline section with its assigned optimization terms (phase 3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOutline {
    pub headline: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "header-terms", default)]
    pub header_terms: Vec<String>,
    #[serde(rename = "content-terms", default)]
    pub content_terms: Vec<String>,
}

impl SectionOutline {
    pub fn term_count(&self) -> usize {
        self.header_terms.len() + self.content_terms.len()
    }
}

#[derive(Debug, Deserialize)]
struct MergedReply {
    sections: Vec<SectionOutline>,
}

/// Parse the merge completion output.
pub fn parse_merged_sections(content: &str) -> Result<Vec<SectionOutline>, AppError> {
    let reply: MergedReply =
        serde_json::from_str(content).map_err(|e| AppError::parse("merged outline", e))?;
    if reply.sections.is_empty() {
        return Err(AppError::parse("merged outline", "no sections"));
    }
    Ok(reply.sections)
}
