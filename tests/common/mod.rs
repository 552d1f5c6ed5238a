//! Shared testing utilities for mediaforge CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated working directory with its own config and artifact root.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        Self { root }
    }

    pub fn work_dir(&self) -> &Path {
        self.root.path()
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.path().join("artifacts")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.path().join("mediaforge.toml")
    }

    /// Write `mediaforge.toml` with the artifact root plus `extra` sections.
    pub fn write_config(&self, extra: &str) {
        let content = format!(
            "[storage]\nartifacts_dir = \"{}\"\n\n{}",
            self.artifacts_dir().display().to_string().replace('\\', "/"),
            extra
        );
        fs::write(self.config_path(), content).expect("Failed to write config");
    }

    /// Command for the compiled binary with credentials and overrides cleared.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("mediaforge").expect("Failed to locate mediaforge binary");
        cmd.current_dir(self.work_dir())
            .env_remove("OPENAI_API_KEY")
            .env_remove("NEURONWRITER_API_KEY")
            .env_remove("IDEOGRAM_API_KEY")
            .env_remove("MEDIAFORGE_CONFIG")
            .env_remove("PORT")
            .env("RUST_LOG", "off")
            .write_stdin("");
        cmd
    }

    /// Write a phase artifact under the artifact root.
    pub fn write_artifact(&self, relative: &str, content: &str) {
        let path = self.artifacts_dir().join(relative);
        fs::create_dir_all(path.parent().expect("artifact path has a parent"))
            .expect("Failed to create artifact directory");
        fs::write(path, content).expect("Failed to write artifact");
    }

    pub fn read_artifact(&self, relative: &str) -> String {
        fs::read_to_string(self.artifacts_dir().join(relative)).expect("Failed to read artifact")
    }
}
