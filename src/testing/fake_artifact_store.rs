use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::domain::{AppError, ArtifactKind, Keyword};
use crate::ports::ArtifactStore;

/// Artifact store kept in memory under a virtual root.
#[derive(Clone, Default)]
pub struct MemoryArtifactStore {
    files: Arc<Mutex<BTreeMap<PathBuf, Vec<u8>>>>,
    /// Makes side-file writes fail.
    pub side_files_fail: Arc<Mutex<bool>>,
}

const ROOT: &str = "/artifacts";

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    pub fn text(&self, path: &Path) -> Option<String> {
        self.files.lock().unwrap().get(path).map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn locate(&self, kind: ArtifactKind, keyword: &Keyword) -> PathBuf {
        Path::new(ROOT).join(kind.relative_path(&keyword.sanitized()))
    }

    fn read_text(&self, kind: ArtifactKind, keyword: &Keyword) -> Result<String, AppError> {
        let path = self.locate(kind, keyword);
        self.text(&path).ok_or(AppError::ArtifactNotFound(path))
    }

    fn write_text(&self, kind: ArtifactKind, keyword: &Keyword, content: &str) -> Result<PathBuf, AppError> {
        let path = self.locate(kind, keyword);
        self.files.lock().unwrap().insert(path.clone(), content.as_bytes().to_vec());
        Ok(path)
    }

    fn write_side_file(&self, bucket: &str, name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        if *self.side_files_fail.lock().unwrap() {
            return Err(AppError::Io(std::io::Error::other("disk full")));
        }
        let path = Path::new(ROOT).join(bucket).join(name);
        self.files.lock().unwrap().insert(path.clone(), bytes.to_vec());
        Ok(path)
    }
}
