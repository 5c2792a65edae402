//! CI environment snapshot
//!
//! Captured once by the command so resolution code stays pure.

/// GitLab-style CI variables relevant to deployments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiEnv {
    /// CI_COMMIT_TAG
    pub commit_tag: Option<String>,
    /// CI_COMMIT_REF_NAME
    pub commit_ref_name: Option<String>,
    /// CI_COMMIT_SHA
    pub commit_sha: Option<String>,
    /// CI_REGISTRY
    pub registry: Option<String>,
    /// CI_JOB_TOKEN
    pub job_token: Option<String>,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl CiEnv {
    pub fn from_env() -> Self {
        Self {
            commit_tag: non_empty_var("CI_COMMIT_TAG"),
            commit_ref_name: non_empty_var("CI_COMMIT_REF_NAME"),
            commit_sha: non_empty_var("CI_COMMIT_SHA"),
            registry: non_empty_var("CI_REGISTRY"),
            job_token: non_empty_var("CI_JOB_TOKEN"),
        }
    }
}
