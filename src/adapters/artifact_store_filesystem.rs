//! `ArtifactStore` implementation rooted at a local directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{AppError, ArtifactKind, Keyword};
use crate::ports::ArtifactStore;

#[derive(Debug, Clone)]
pub struct FilesystemArtifactStore {
    root: PathBuf,
}

impl FilesystemArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "artifact written");
        Ok(())
    }
}

/// Side-file segments must stay inside the artifact root.
fn plain_segment(segment: &str) -> Result<&str, AppError> {
    let valid = !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\']);
    if valid {
        Ok(segment)
    } else {
        Err(AppError::validation(format!("Invalid artifact file name: '{}'", segment)))
    }
}

impl ArtifactStore for FilesystemArtifactStore {
    fn locate(&self, kind: ArtifactKind, keyword: &Keyword) -> PathBuf {
        self.root.join(kind.relative_path(&keyword.sanitized()))
    }

    fn read_text(&self, kind: ArtifactKind, keyword: &Keyword) -> Result<String, AppError> {
        let path = self.locate(kind, keyword);
        if !path.is_file() {
            return Err(AppError::ArtifactNotFound(path));
        }
        Ok(fs::read_to_string(path)?)
    }

    fn write_text(&self, kind: ArtifactKind, keyword: &Keyword, content: &str) -> Result<PathBuf, AppError> {
        let path = self.locate(kind, keyword);
        self.write(&path, content.as_bytes())?;
        Ok(path)
    }

    fn write_side_file(&self, bucket: &str, name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        let path = self.root.join(plain_segment(bucket)?).join(plain_segment(name)?);
        self.write(&path, bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OutlineArtifact, Outline, OutlineSection, PhaseMetadata};
    use crate::ports::ArtifactStoreExt;
    use chrono::Utc;
    use tempfile::TempDir;

    fn keyword() -> Keyword {
        Keyword::new("Raccoon Removal Houston").unwrap()
    }

    #[test]
    fn saves_under_sanitized_keyword_and_loads_back() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemArtifactStore::new(dir.path());
        let artifact = OutlineArtifact {
            keyword: "Raccoon Removal Houston".into(),
            generated_at: Utc::now(),
            phase: 2,
            outline: Outline {
                sections: vec![OutlineSection { header: "Signs".into(), description: "What to look for".into() }],
            },
            metadata: PhaseMetadata::default(),
        };

        let path = store.save(&keyword(), &artifact).unwrap();

        assert_eq!(path, dir.path().join("outlines/phase2_outline_raccoon_removal_houston.json"));
        let loaded: OutlineArtifact = store.load(&keyword()).unwrap();
        assert_eq!(loaded.outline, artifact.outline);
    }

    #[test]
    fn missing_artifact_names_the_path() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemArtifactStore::new(dir.path());

        match store.read_text(ArtifactKind::Article, &keyword()) {
            Err(AppError::ArtifactNotFound(path)) => {
                assert!(path.ends_with("articles/phase4_article_raccoon_removal_houston.json"))
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn side_files_reject_path_segments() {
        let dir = TempDir::new().unwrap();
        let store = FilesystemArtifactStore::new(dir.path());

        let path = store.write_side_file("images", "raccoon_1.png", &[1, 2, 3]).unwrap();
        assert_eq!(fs::read(path).unwrap(), vec![1, 2, 3]);

        assert!(store.write_side_file("images", "../escape.png", &[]).is_err());
        assert!(store.write_side_file("..", "x.png", &[]).is_err());
    }
}
