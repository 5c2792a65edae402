//! Git operations
//!
//! Reads commit, branch and tag of the project checkout for provenance.
//! Uses the git CLI; nothing here writes to the repository.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

use crate::domain::GitInfo;
use crate::error::GitError;
use crate::tools::{get_tool_path, tools};

/// Source of git provenance for the project
#[async_trait]
pub trait ProvenanceSource: Send + Sync {
    async fn git_info(&self) -> Result<GitInfo, GitError>;
}

/// Client for git operations
pub struct GitClient {
    /// Working directory for git commands
    working_dir: PathBuf,
}

impl GitClient {
    /// Create a git client for a specific directory
    pub fn in_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: path.into(),
        }
    }

    /// Run git with `args`, returning trimmed stdout or `None` on non-zero exit
    async fn run(&self, args: &[&str]) -> Result<Option<String>, GitError> {
        let output = Command::new(get_tool_path(tools::GIT))
            .args(args)
            .current_dir(&self.working_dir)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            debug!(
                "git {} exited with {:?}: {}",
                args.join(" "),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Some(stdout).filter(|s| !s.is_empty()))
    }

    /// Check the working directory is inside a git work tree
    pub async fn is_repository(&self) -> Result<bool, GitError> {
        Ok(self
            .run(&["rev-parse", "--is-inside-work-tree"])
            .await?
            .as_deref()
            == Some("true"))
    }

    /// Full SHA of HEAD; `None` for a repository without commits
    pub async fn head_commit(&self) -> Result<Option<String>, GitError> {
        self.run(&["rev-parse", "HEAD"]).await
    }

    /// Current branch name; `None` when HEAD is detached
    pub async fn current_branch(&self) -> Result<Option<String>, GitError> {
        let branch = self.run(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        Ok(branch.filter(|b| b != "HEAD"))
    }

    /// Tag pointing exactly at HEAD, if any
    pub async fn head_tag(&self) -> Result<Option<String>, GitError> {
        self.run(&["describe", "--tags", "--exact-match", "HEAD"])
            .await
    }
}

#[async_trait]
impl ProvenanceSource for GitClient {
    async fn git_info(&self) -> Result<GitInfo, GitError> {
        if !self.is_repository().await? {
            return Err(GitError::NotARepository {
                path: self.working_dir.display().to_string(),
            });
        }

        let commit = self.head_commit().await?;
        if let Some(branch) = self.current_branch().await? {
            return Ok(GitInfo::on_branch(commit, branch));
        }
        if let Some(tag) = self.head_tag().await? {
            return Ok(GitInfo::on_tag(commit, tag));
        }
        Ok(GitInfo::detached(commit))
    }
}
