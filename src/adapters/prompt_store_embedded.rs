use include_dir::{Dir, include_dir};

use crate::domain::{AppError, PromptTemplate};
use crate::ports::PromptStore;

static PROMPTS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets/prompts");

/// Prompt files compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedPromptStore;

impl EmbeddedPromptStore {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn raw(&self, name: &str) -> Option<&'static str> {
        if !is_valid_prompt_name(name) {
            return None;
        }
        PROMPTS_DIR.get_file(format!("{}.json", name)).and_then(|f| f.contents_utf8())
    }
}

impl PromptStore for EmbeddedPromptStore {
    fn load(&self, name: &str) -> Result<PromptTemplate, AppError> {
        let raw = self.raw(name).ok_or_else(|| AppError::PromptNotFound(name.to_string()))?;
        PromptTemplate::from_json(name, raw)
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = PROMPTS_DIR
            .files()
            .filter_map(|f| {
                let path = f.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    return None;
                }
                path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
            })
            .collect();
        names.sort();
        names
    }
}

/// Prompt names are plain identifiers; anything else never resolves to a file.
pub(crate) fn is_valid_prompt_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
