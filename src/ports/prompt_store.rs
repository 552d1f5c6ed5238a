use crate::domain::{AppError, PromptTemplate};

/// Port for loading named prompt templates.
pub trait PromptStore: Send + Sync {
    /// Load a template by name. Absent names are `PromptNotFound`.
    fn load(&self, name: &str) -> Result<PromptTemplate, AppError>;

    /// Names of every available template, sorted.
    fn names(&self) -> Vec<String>;
}
