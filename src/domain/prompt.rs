//! Prompt templates and `{{placeholder}}` substitution.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::AppError;

/// Sampling parameters forwarded verbatim to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default)]
    pub frequency_penalty: f64,
    #[serde(default)]
    pub presence_penalty: f64,
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_top_p() -> f64 {
    1.0
}

/// Function-calling schema that constrains the completion output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A named prompt configuration loaded from the prompt store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    #[serde(skip)]
    pub name: String,
    #[serde(flatten)]
    pub sampling: SamplingParams,
    pub system: String,
    #[serde(default)]
    pub user: String,
    #[serde(rename = "output-schema", default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<OutputSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_criteria: Option<String>,
}

impl PromptTemplate {
    /// Parse a prompt file. `model` and `system` are mandatory.
    pub fn from_json(name: &str, raw: &str) -> Result<Self, AppError> {
        let mut template: PromptTemplate = serde_json::from_str(raw)
            .map_err(|e| AppError::parse(format!("prompt '{}'", name), e))?;
        if template.sampling.model.trim().is_empty() {
            return Err(AppError::parse(format!("prompt '{}'", name), "model is empty"));
        }
        if template.system.trim().is_empty() {
            return Err(AppError::parse(format!("prompt '{}'", name), "system message is empty"));
        }
        template.name = name.to_string();
        Ok(template)
    }

    /// Non-empty rubric text, if the template carries one.
    pub fn quality_criteria(&self) -> Option<&str> {
        self.quality_criteria.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    /// Substitute `context` into both messages.
    pub fn render(
        &self,
        context: &SubstitutionContext,
        policy: PlaceholderPolicy,
    ) -> Result<RenderedPrompt, AppError> {
        if policy == PlaceholderPolicy::Strict {
            let mut missing: BTreeSet<String> = BTreeSet::new();
            for text in [&self.system, &self.user] {
                for name in placeholders(text) {
                    if !context.contains(&name) {
                        missing.insert(name);
                    }
                }
            }
            if !missing.is_empty() {
                let names: Vec<String> = missing.into_iter().collect();
                return Err(AppError::validation(format!(
                    "prompt '{}' has unresolved placeholders: {}",
                    self.name,
                    names.join(", ")
                )));
            }
        }

        Ok(RenderedPrompt {
            system: substitute(&self.system, context),
            user: substitute(&self.user, context),
        })
    }
}

/// System and user messages after substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

/// What to do with `{{name}}` placeholders that the context does not cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderPolicy {
    /// Leave them in the text.
    #[default]
    Lenient,
    /// Refuse to render.
    Strict,
}

/// Scalar value substituted into a template.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Text(s) => f.write_str(s),
            ScalarValue::Integer(n) => write!(f, "{}", n),
            ScalarValue::Float(n) => write!(f, "{}", n),
            ScalarValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Text(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Text(value)
    }
}

impl From<&String> for ScalarValue {
    fn from(value: &String) -> Self {
        ScalarValue::Text(value.clone())
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Integer(value)
    }
}

impl From<usize> for ScalarValue {
    fn from(value: usize) -> Self {
        ScalarValue::Integer(value as i64)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

/// Ordered placeholder bindings. Re-inserting a key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstitutionContext {
    entries: Vec<(String, ScalarValue)>,
}

impl SubstitutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<ScalarValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<ScalarValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScalarValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Replace every literal `{{key}}` with the value's string form. No escaping.
pub fn substitute(template: &str, context: &SubstitutionContext) -> String {
    let mut out = template.to_string();
    for (key, value) in context.iter() {
        let needle = format!("{{{{{}}}}}", key);
        if out.contains(&needle) {
            out = out.replace(&needle, &value.to_string());
        }
    }
    out
}

/// Placeholder names (`{{name}}`) appearing in `text`, in order of first appearance.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !found.iter().any(|n: &String| n == name)
        {
            found.push(name.to_string());
        }
        rest = &after[end + 2..];
    }
    found
}
