//! Registry authentication scoped to one invocation
//!
//! Credentials are written into a disposable working directory owned by
//! [`AuthSession`]. Dropping the session removes the directory, so nothing is
//! left on disk after the command returns, whether it succeeded or not.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info};

use super::registry::{RegistryClient, RegistryClientFactory, RegistryCredentials, AUTH_FILE_NAME};
use super::workspace::Workspace;
use crate::domain::CiEnv;
use crate::error::AuthError;

/// Username GitLab accepts together with CI_JOB_TOKEN
const GITLAB_CI_USERNAME: &str = "gitlab-ci-token";

/// Credentials passed on the command line
#[derive(Debug, Clone, Default)]
pub struct CredentialOptions {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// A logged-in registry client and the directory backing it
pub struct AuthSession {
    client: Arc<dyn RegistryClient>,
    workdir: TempDir,
}

impl AuthSession {
    pub fn client(&self) -> Arc<dyn RegistryClient> {
        Arc::clone(&self.client)
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("workdir", &self.workdir.path())
            .finish()
    }
}

/// Pick the credentials to log in with.
///
/// Priority:
/// 1. `--registry-username` / `--registry-password` (both required)
/// 2. GitLab CI job token, when the registry lives under CI_REGISTRY
/// 3. None: reuse the home docker config
pub fn resolve_credentials(
    options: &CredentialOptions,
    registry_path: &str,
    ci: &CiEnv,
) -> Result<Option<RegistryCredentials>, AuthError> {
    let username = options.username.as_deref().filter(|u| !u.is_empty());
    let password = options.password.as_deref().filter(|p| !p.is_empty());

    match (username, password) {
        (Some(username), Some(password)) => {
            return Ok(Some(RegistryCredentials::new(username, password)))
        }
        (Some(_), None) | (None, Some(_)) => return Err(AuthError::IncompleteCredentials),
        (None, None) => {}
    }

    if let (Some(ci_registry), Some(token)) = (&ci.registry, &ci.job_token) {
        if registry_path.starts_with(ci_registry.as_str()) {
            debug!("Using CI job token for {}", ci_registry);
            return Ok(Some(RegistryCredentials::new(GITLAB_CI_USERNAME, token.clone())));
        }
    }

    Ok(None)
}

/// Docker config directory: DOCKER_CONFIG or ~/.docker
pub fn home_docker_config_dir() -> Option<PathBuf> {
    std::env::var_os("DOCKER_CONFIG")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".docker")))
}

/// Copy the home docker config into the working directory, if there is one.
fn seed_docker_config(docker_config_dir: Option<&Path>, workdir: &Path) -> Result<(), AuthError> {
    let Some(source) = docker_config_dir.map(|dir| dir.join(AUTH_FILE_NAME)) else {
        return Ok(());
    };
    if !source.exists() {
        debug!("No docker config at {}", source.display());
        return Ok(());
    }

    std::fs::copy(&source, workdir.join(AUTH_FILE_NAME)).map_err(|source_err| {
        AuthError::SeedConfig {
            path: source.display().to_string(),
            source: source_err,
        }
    })?;
    debug!("Seeded credentials from {}", source.display());
    Ok(())
}

/// Registry authenticator
pub struct RegistryAuthenticator {
    factory: Arc<dyn RegistryClientFactory>,
    docker_config_dir: Option<PathBuf>,
}

impl RegistryAuthenticator {
    pub fn new(factory: Arc<dyn RegistryClientFactory>) -> Self {
        Self {
            factory,
            docker_config_dir: home_docker_config_dir(),
        }
    }

    /// Use a specific docker config directory instead of the home one
    #[cfg(test)]
    pub fn with_docker_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.docker_config_dir = dir;
        self
    }

    /// Acquire a working directory, bind a client to it and log in.
    ///
    /// On any error the directory is released before returning.
    pub async fn authenticate(
        &self,
        workspace: &Workspace,
        registry_path: &str,
        options: &CredentialOptions,
        ci: &CiEnv,
    ) -> Result<AuthSession, AuthError> {
        let credentials = resolve_credentials(options, registry_path, ci)?;
        let workdir = workspace.acquire_project_dir().map_err(AuthError::Workdir)?;

        if credentials.is_none() {
            seed_docker_config(self.docker_config_dir.as_deref(), workdir.path())?;
        }

        let client = self.factory.bind(workdir.path());
        client.login(registry_path, credentials.as_ref()).await?;

        info!("Authenticated to {}", registry_path);
        Ok(AuthSession { client, workdir })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ci_with_token(registry: &str) -> CiEnv {
        CiEnv {
            registry: Some(registry.to_string()),
            job_token: Some("job-token".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_explicit_credentials_win() {
        let options = CredentialOptions {
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
        };
        let creds = resolve_credentials(
            &options,
            "registry.gitlab.com/demo",
            &ci_with_token("registry.gitlab.com"),
        )
        .unwrap();
        assert_eq!(creds, Some(RegistryCredentials::new("user", "pass")));
    }

    #[test]
    fn test_half_credentials_rejected() {
        let options = CredentialOptions {
            username: Some("user".to_string()),
            password: None,
        };
        let result = resolve_credentials(&options, "registry.example.com/demo", &CiEnv::default());
        assert!(matches!(result, Err(AuthError::IncompleteCredentials)));
    }

    #[test]
    fn test_ci_job_token_for_ci_registry() {
        let creds = resolve_credentials(
            &CredentialOptions::default(),
            "registry.gitlab.com/group/demo",
            &ci_with_token("registry.gitlab.com"),
        )
        .unwrap();
        assert_eq!(
            creds,
            Some(RegistryCredentials::new(GITLAB_CI_USERNAME, "job-token"))
        );
    }

    #[test]
    fn test_ci_job_token_ignored_for_other_registry() {
        let creds = resolve_credentials(
            &CredentialOptions::default(),
            "registry.example.com/demo",
            &ci_with_token("registry.gitlab.com"),
        )
        .unwrap();
        assert_eq!(creds, None);
    }

    #[test]
    fn test_seed_docker_config_copies_file() {
        let home = tempfile::tempdir().unwrap();
        let workdir = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join(AUTH_FILE_NAME), r#"{"auths":{}}"#).unwrap();

        seed_docker_config(Some(home.path()), workdir.path()).unwrap();
        let copied = std::fs::read_to_string(workdir.path().join(AUTH_FILE_NAME)).unwrap();
        assert_eq!(copied, r#"{"auths":{}}"#);
    }

    #[test]
    fn test_seed_docker_config_without_file() {
        let home = tempfile::tempdir().unwrap();
        let workdir = tempfile::tempdir().unwrap();

        seed_docker_config(Some(home.path()), workdir.path()).unwrap();
        assert!(!workdir.path().join(AUTH_FILE_NAME).exists());
    }
}
