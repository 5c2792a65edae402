//! Deploy tag resolution

use super::ci::CiEnv;
use super::slug;
use super::values::Provenance;
use crate::error::ConfigError;

/// Tag options from the command line; at most one may be set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOptions {
    /// --tag
    pub custom: Option<String>,
    /// --tag-git-branch
    pub git_branch: bool,
    /// --tag-git-tag
    pub git_tag: bool,
    /// --tag-git-commit
    pub git_commit: bool,
    /// --tag-ci
    pub ci: bool,
}

impl TagOptions {
    #[cfg(test)]
    pub fn custom(tag: impl Into<String>) -> Self {
        Self {
            custom: Some(tag.into()),
            ..Default::default()
        }
    }

    fn selected(&self) -> Vec<TagSource> {
        let custom = self
            .custom
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        [
            (custom, TagSource::Custom),
            (self.git_branch, TagSource::GitBranch),
            (self.git_tag, TagSource::GitTag),
            (self.git_commit, TagSource::GitCommit),
            (self.ci, TagSource::Ci),
        ]
        .into_iter()
        .filter_map(|(set, source)| set.then_some(source))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagSource {
    Custom,
    GitBranch,
    GitTag,
    GitCommit,
    Ci,
}

impl TagSource {
    fn flag(&self) -> &'static str {
        match self {
            Self::Custom => "--tag",
            Self::GitBranch => "--tag-git-branch",
            Self::GitTag => "--tag-git-tag",
            Self::GitCommit => "--tag-git-commit",
            Self::Ci => "--tag-ci",
        }
    }
}

fn unresolved(reason: impl Into<String>) -> ConfigError {
    ConfigError::TagUnresolved {
        reason: reason.into(),
    }
}

/// Resolve the deploy tag.
///
/// Priority:
/// 1. The single tag option given on the command line
/// 2. `deploy.default_tag` from the project config
/// 3. Git tag at HEAD, then git branch
///
/// The result is slugified into a valid Docker tag.
pub fn resolve_tag(
    options: &TagOptions,
    default_tag: Option<&str>,
    provenance: &Provenance,
    ci: &CiEnv,
) -> Result<String, ConfigError> {
    let selected = options.selected();
    if selected.len() > 1 {
        return Err(ConfigError::ConflictingTagOptions {
            options: selected
                .iter()
                .map(TagSource::flag)
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    let git = provenance.git();
    let raw = match selected.first().copied() {
        Some(TagSource::Custom) => options.custom.clone(),
        Some(TagSource::GitBranch) => {
            let branch = git.and_then(|g| g.branch.clone());
            Some(branch.ok_or_else(|| unresolved("--tag-git-branch: HEAD is not on a branch"))?)
        }
        Some(TagSource::GitTag) => {
            let tag = git.and_then(|g| g.tag.clone());
            Some(tag.ok_or_else(|| unresolved("--tag-git-tag: no git tag at HEAD"))?)
        }
        Some(TagSource::GitCommit) => {
            let commit = git.and_then(|g| g.commit.clone());
            Some(commit.ok_or_else(|| unresolved("--tag-git-commit: commit is unknown"))?)
        }
        Some(TagSource::Ci) => {
            let ci_ref = ci.commit_tag.clone().or_else(|| ci.commit_ref_name.clone());
            Some(ci_ref.ok_or_else(|| {
                unresolved("--tag-ci: neither CI_COMMIT_TAG nor CI_COMMIT_REF_NAME is set")
            })?)
        }
        None => default_tag
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .or_else(|| git.and_then(|g| g.tag.clone().or_else(|| g.branch.clone()))),
    };

    let raw = raw.ok_or_else(|| {
        unresolved(
            "no tag option given, no deploy.default_tag configured and git provenance is unavailable",
        )
    })?;

    let tag = slug::docker_tag(raw.trim());
    if tag.is_empty() {
        return Err(unresolved(format!("'{}' is not a usable docker tag", raw)));
    }
    Ok(tag)
}
