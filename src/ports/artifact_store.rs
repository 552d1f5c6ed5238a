//! Phase artifact persistence port definition.

use std::path::PathBuf;

use crate::domain::{AppError, ArtifactKind, Keyword};

/// Port for reading and writing phase artifacts keyed by sanitized keyword.
///
/// JSON helpers live on [`ArtifactStoreExt`]; implementors only move text and bytes.
pub trait ArtifactStore: Send + Sync {
    /// Location an artifact is (or would be) stored at.
    fn locate(&self, kind: ArtifactKind, keyword: &Keyword) -> PathBuf;

    fn read_text(&self, kind: ArtifactKind, keyword: &Keyword) -> Result<String, AppError>;

    fn write_text(&self, kind: ArtifactKind, keyword: &Keyword, content: &str) -> Result<PathBuf, AppError>;

    /// Store a side file (image bytes, debug dumps) under `bucket/name`.
    fn write_side_file(&self, bucket: &str, name: &str, bytes: &[u8]) -> Result<PathBuf, AppError>;
}

/// Typed JSON access on top of [`ArtifactStore`].
pub trait ArtifactStoreExt: ArtifactStore {
    fn load<T: crate::domain::JsonArtifact>(&self, keyword: &Keyword) -> Result<T, AppError> {
        let raw = self.read_text(T::KIND, keyword)?;
        serde_json::from_str(&raw).map_err(|e| AppError::parse(T::KIND.label(), e))
    }

    fn save<T: crate::domain::JsonArtifact>(&self, keyword: &Keyword, artifact: &T) -> Result<PathBuf, AppError> {
        let json = serde_json::to_string_pretty(artifact)
            .map_err(|e| AppError::parse(T::KIND.label(), e))?;
        self.write_text(T::KIND, keyword, &json)
    }
}

impl<S: ArtifactStore + ?Sized> ArtifactStoreExt for S {}
