use std::path::PathBuf;

use tracing::debug;

use super::prompt_store_embedded::{EmbeddedPromptStore, is_valid_prompt_name};
use crate::domain::{AppError, PromptTemplate};
use crate::ports::PromptStore;

/// Prompt directory layered over the built-in prompts.
///
/// `<dir>/<name>.json` wins when present; otherwise the embedded copy is used.
#[derive(Debug, Clone)]
pub struct FilesystemPromptStore {
    dir: PathBuf,
    fallback: EmbeddedPromptStore,
}

impl FilesystemPromptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), fallback: EmbeddedPromptStore::new() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl PromptStore for FilesystemPromptStore {
    fn load(&self, name: &str) -> Result<PromptTemplate, AppError> {
        if !is_valid_prompt_name(name) {
            return Err(AppError::PromptNotFound(name.to_string()));
        }

        let path = self.path_for(name);
        if path.is_file() {
            debug!(path = %path.display(), "loading prompt override");
            let raw = std::fs::read_to_string(&path)?;
            return PromptTemplate::from_json(name, &raw);
        }
        self.fallback.load(name)
    }

    fn names(&self) -> Vec<String> {
        let mut names = self.fallback.names();
        if let Ok(entries) = std::fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                    && is_valid_prompt_name(stem)
                    && !names.iter().any(|n| n == stem)
                {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn override_file_takes_precedence() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("loop_prompt.json"),
            r#"{"model": "gpt-4o", "system": "Override system", "user": "{{keyword}}"}"#,
        )
        .unwrap();

        let store = FilesystemPromptStore::new(dir.path());
        let template = store.load("loop_prompt").unwrap();

        assert_eq!(template.system, "Override system");
        assert_eq!(template.sampling.model, "gpt-4o");
    }

    #[test]
    fn falls_back_to_builtin_and_lists_extra_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("custom_prompt.json"), r#"{"model": "m", "system": "s"}"#).unwrap();

        let store = FilesystemPromptStore::new(dir.path());

        assert!(store.load("outline_creation_prompt").is_ok());
        let names = store.names();
        assert!(names.contains(&"custom_prompt".to_string()));
        assert!(names.contains(&"outline_creation_prompt".to_string()));
    }

    #[test]
    fn malformed_override_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("loop_prompt.json"), r#"{"system": "no model"}"#).unwrap();

        let store = FilesystemPromptStore::new(dir.path());
        assert!(matches!(store.load("loop_prompt"), Err(AppError::ParseError { .. })));
    }
}
