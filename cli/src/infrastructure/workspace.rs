//! Process workspace: the tmp directory
//!
//! Created explicitly by the command and passed down, so tests can point
//! the whole pipeline at a temporary root.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

use crate::error::InitError;

/// Prefix of per-invocation working directories
const PROJECT_DIR_PREFIX: &str = "deckhand-project-data-";

/// Bootstrapped tmp directory
#[derive(Debug, Clone)]
pub struct Workspace {
    tmp_dir: PathBuf,
}

impl Workspace {
    /// Create (if needed) the tmp directory. Default: `$TMPDIR/deckhand`.
    pub fn init(tmp_dir: Option<PathBuf>) -> Result<Self, InitError> {
        let tmp_dir = tmp_dir.unwrap_or_else(|| std::env::temp_dir().join("deckhand"));

        let workspace = Self { tmp_dir };
        create_dir("tmp", &workspace.tmp_dir)?;
        create_dir("tmp", &workspace.projects_dir())?;

        debug!("Workspace ready: tmp={}", workspace.tmp_dir.display());
        Ok(workspace)
    }

    fn projects_dir(&self) -> PathBuf {
        self.tmp_dir.join("projects")
    }

    /// Acquire a disposable working directory.
    ///
    /// The directory is removed when the returned guard is dropped.
    pub fn acquire_project_dir(&self) -> std::io::Result<TempDir> {
        let dir = tempfile::Builder::new()
            .prefix(PROJECT_DIR_PREFIX)
            .tempdir_in(self.projects_dir())?;
        debug!("Acquired working directory {}", dir.path().display());
        Ok(dir)
    }
}

fn create_dir(kind: &'static str, path: &Path) -> Result<(), InitError> {
    std::fs::create_dir_all(path).map_err(|source| InitError::Directory {
        kind,
        path: path.display().to_string(),
        source,
    })
}
