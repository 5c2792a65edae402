//! Service values composer
//!
//! Sequences target resolution, optional registry authentication, image
//! getter wiring and document assembly. The registry mode is chosen once
//! from the images repo and never re-checked downstream.

use std::sync::Arc;
use tracing::info;

use super::image_info::build_getters;
use super::provenance::collect_provenance;
use super::service_values::{build_service_values, ValuesHeader};
use crate::config::ProjectConfig;
use crate::domain::{resolve_registry_path, resolve_target, CiEnv, RegistryMode, ServiceValues, TargetOptions};
use crate::error::ComposeError;
use crate::infrastructure::{CredentialOptions, ProvenanceSource, RegistryAuthenticator, Workspace};

/// Inputs of one composition
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub config: ProjectConfig,
    /// Images repo flag; blank or absent means no registry
    pub images_repo: Option<String>,
    pub credentials: CredentialOptions,
    pub target: TargetOptions,
    pub ci: CiEnv,
}

#[cfg(test)]
impl ComposeRequest {
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            images_repo: None,
            credentials: CredentialOptions::default(),
            target: TargetOptions::default(),
            ci: CiEnv::default(),
        }
    }
}

/// Composer with its collaborators injected
pub struct Composer {
    workspace: Workspace,
    authenticator: RegistryAuthenticator,
    provenance: Arc<dyn ProvenanceSource>,
}

impl Composer {
    pub fn new(
        workspace: Workspace,
        authenticator: RegistryAuthenticator,
        provenance: Arc<dyn ProvenanceSource>,
    ) -> Self {
        Self {
            workspace,
            authenticator,
            provenance,
        }
    }

    /// Produce the service values document, or the first fatal error.
    pub async fn compose(&self, request: &ComposeRequest) -> Result<ServiceValues, ComposeError> {
        let config = &request.config;

        let provenance = collect_provenance(self.provenance.as_ref(), &request.ci).await;
        let target = resolve_target(&request.target, config, &provenance, &request.ci)?;

        let registry_path = resolve_registry_path(request.images_repo.as_deref(), &config.project);
        let mode = RegistryMode::from_path(&registry_path);
        info!(
            "Composing service values for {} (registry: {}, namespace: {}, tag: {})",
            config.project,
            mode.display_path(),
            target.namespace,
            target.tag
        );

        // The session owns the working directory; it must outlive getter resolution.
        let (session, client) = match &mode {
            RegistryMode::WithoutRegistry => (None, None),
            RegistryMode::WithRegistry(registry) => {
                let session = self
                    .authenticator
                    .authenticate(&self.workspace, registry, &request.credentials, &request.ci)
                    .await?;
                let client = session.client();
                (Some(session), Some(client))
            }
        };

        let getters = build_getters(&config.images, &target.tag, &mode, client.as_ref());
        let header = ValuesHeader {
            project: &config.project,
            registry: mode.display_path(),
            target: &target,
            provenance,
        };
        let values = build_service_values(header, getters).await;

        drop(client);
        drop(session);

        Ok(values?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::deploy::EnvironmentConfig;
    use crate::config::ImageDef;
    use crate::domain::{GitInfo, Provenance, TagOptions};
    use crate::error::{AuthError, ConfigError, GitError, ImageInfoError};
    use crate::infrastructure::registry::{RegistryClient, RegistryClientFactory, RegistryCredentials};
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Registry stub that records what the composer asked for
    #[derive(Default)]
    struct StubRegistry {
        reject_login: bool,
        missing: Option<String>,
        workdirs: Mutex<Vec<PathBuf>>,
        logins: Mutex<Vec<(String, Option<RegistryCredentials>)>>,
        lookups: Mutex<Vec<String>>,
    }

    struct BoundStub {
        registry: Arc<StubRegistry>,
    }

    #[async_trait]
    impl RegistryClient for BoundStub {
        async fn login(
            &self,
            registry_path: &str,
            credentials: Option<&RegistryCredentials>,
        ) -> Result<(), AuthError> {
            self.registry
                .logins
                .lock()
                .unwrap()
                .push((registry_path.to_string(), credentials.cloned()));
            if self.registry.reject_login {
                return Err(AuthError::LoginFailed {
                    registry: registry_path.to_string(),
                    message: "unauthorized: incorrect username or password".to_string(),
                });
            }
            Ok(())
        }

        async fn image_digest(&self, reference: &str) -> Result<String, ImageInfoError> {
            self.registry.lookups.lock().unwrap().push(reference.to_string());
            if self.registry.missing.as_deref() == Some(reference) {
                return Err(ImageInfoError::NotFound {
                    reference: reference.to_string(),
                });
            }
            let name = reference.rsplit('/').next().unwrap_or(reference);
            Ok(format!("sha256:{}", name.replace(':', "-")))
        }
    }

    struct StubFactory(Arc<StubRegistry>);

    impl RegistryClientFactory for StubFactory {
        fn bind(&self, workdir: &Path) -> Arc<dyn RegistryClient> {
            assert!(workdir.is_dir());
            self.0.workdirs.lock().unwrap().push(workdir.to_path_buf());
            Arc::new(BoundStub {
                registry: Arc::clone(&self.0),
            })
        }
    }

    /// Fails the test if any registry access is attempted
    struct ForbiddenFactory;

    impl RegistryClientFactory for ForbiddenFactory {
        fn bind(&self, workdir: &Path) -> Arc<dyn RegistryClient> {
            panic!("registry client bound to {} without a registry", workdir.display());
        }
    }

    struct FixedProvenance(Option<GitInfo>);

    #[async_trait]
    impl ProvenanceSource for FixedProvenance {
        async fn git_info(&self) -> Result<GitInfo, GitError> {
            self.0.clone().ok_or_else(|| GitError::NotARepository {
                path: "/project".to_string(),
            })
        }
    }

    fn workspace(root: &TempDir) -> Workspace {
        Workspace::init(Some(root.path().join("tmp"))).unwrap()
    }

    fn composer(root: &TempDir, factory: Arc<dyn RegistryClientFactory>) -> Composer {
        let authenticator = RegistryAuthenticator::new(factory).with_docker_config_dir(None);
        Composer::new(
            workspace(root),
            authenticator,
            Arc::new(FixedProvenance(None)),
        )
    }

    fn demo_request(environment: &str, tag: &str) -> ComposeRequest {
        let mut config = ProjectConfig::new("demo", vec![ImageDef::new("web"), ImageDef::new("worker")]);
        config.deploy.environments.insert(
            "test".to_string(),
            EnvironmentConfig {
                namespace: "[[ project ]]-[[ env ]]".to_string(),
            },
        );

        let mut request = ComposeRequest::new(config);
        request.target = TargetOptions {
            tag: TagOptions::custom(tag),
            namespace: None,
            environment: Some(environment.to_string()),
        };
        request
    }

    fn registry_request() -> ComposeRequest {
        let mut request = demo_request("test", "v1");
        request.images_repo = Some("registry.example.com/demo".to_string());
        request.credentials = CredentialOptions {
            username: Some("deployer".to_string()),
            password: Some("secret".to_string()),
        };
        request
    }

    fn project_dirs(root: &TempDir) -> usize {
        std::fs::read_dir(root.path().join("tmp").join("projects"))
            .unwrap()
            .count()
    }

    #[tokio::test]
    async fn test_without_registry_scenario() {
        let root = tempfile::tempdir().unwrap();
        let composer = composer(&root, Arc::new(ForbiddenFactory));

        let values = composer.compose(&demo_request("test", "v1")).await.unwrap();

        assert_eq!(values.project, "demo");
        assert_eq!(values.registry, "IMAGES_REPO");
        assert_eq!(values.tag, "v1");
        assert_eq!(values.environment, "test");
        assert_eq!(values.namespace, "demo-test");
        assert_eq!(values.images.names().collect::<Vec<_>>(), vec!["web", "worker"]);
        assert_eq!(
            values.images.get("web").unwrap().image,
            "IMAGES_REPO/web:v1"
        );
        assert_eq!(values.git, Provenance::Unknown);
        assert_eq!(project_dirs(&root), 0);
    }

    #[tokio::test]
    async fn test_with_registry_scenario() {
        let root = tempfile::tempdir().unwrap();
        let registry = Arc::new(StubRegistry::default());
        let composer = composer(&root, Arc::new(StubFactory(registry.clone())));

        let values = composer.compose(&registry_request()).await.unwrap();

        assert_eq!(values.registry, "registry.example.com/demo");
        let web = values.images.get("web").unwrap();
        assert_eq!(web.image, "registry.example.com/demo/web:v1");
        assert_eq!(web.digest.as_deref(), Some("sha256:web-v1"));
        assert_eq!(
            values.images.get("worker").unwrap().digest.as_deref(),
            Some("sha256:worker-v1")
        );

        let logins = registry.logins.lock().unwrap();
        assert_eq!(logins.len(), 1);
        assert_eq!(logins[0].0, "registry.example.com/demo");
        assert_eq!(
            logins[0].1,
            Some(RegistryCredentials::new("deployer", "secret"))
        );

        let workdirs = registry.workdirs.lock().unwrap();
        assert_eq!(workdirs.len(), 1);
        assert!(!workdirs[0].exists());
    }

    #[tokio::test]
    async fn test_auth_failure_stops_before_image_resolution() {
        let root = tempfile::tempdir().unwrap();
        let registry = Arc::new(StubRegistry {
            reject_login: true,
            ..Default::default()
        });
        let composer = composer(&root, Arc::new(StubFactory(registry.clone())));

        let err = composer.compose(&registry_request()).await.unwrap_err();

        assert!(matches!(
            err,
            ComposeError::Authentication(AuthError::LoginFailed { .. })
        ));
        assert!(registry.lookups.lock().unwrap().is_empty());
        let workdirs = registry.workdirs.lock().unwrap();
        assert_eq!(workdirs.len(), 1);
        assert!(!workdirs[0].exists());
        assert_eq!(project_dirs(&root), 0);
    }

    #[tokio::test]
    async fn test_missing_image_releases_workdir() {
        let root = tempfile::tempdir().unwrap();
        let registry = Arc::new(StubRegistry {
            missing: Some("registry.example.com/demo/web:v1".to_string()),
            ..Default::default()
        });
        let composer = composer(&root, Arc::new(StubFactory(registry.clone())));

        let err = composer.compose(&registry_request()).await.unwrap_err();

        match err {
            ComposeError::ServiceValues(e) => assert_eq!(e.image, "web"),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(project_dirs(&root), 0);
    }

    #[tokio::test]
    async fn test_blank_environment_is_env_placeholder() {
        let root = tempfile::tempdir().unwrap();
        let composer = composer(&root, Arc::new(ForbiddenFactory));

        let values = composer.compose(&demo_request("", "v1")).await.unwrap();
        assert_eq!(values.environment, "ENV");
        assert_eq!(values.namespace, "demo-env");
    }

    #[tokio::test]
    async fn test_unresolvable_namespace_is_configuration_error() {
        let root = tempfile::tempdir().unwrap();
        let registry = Arc::new(StubRegistry::default());
        let composer = composer(&root, Arc::new(StubFactory(registry.clone())));

        let mut request = registry_request();
        request.target.environment = Some("production".to_string());

        let err = composer.compose(&request).await.unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Configuration(ConfigError::NamespaceUnresolved { .. })
        ));
        assert!(registry.logins.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_yaml() {
        let root = tempfile::tempdir().unwrap();
        let registry = Arc::new(StubRegistry::default());
        let composer = composer(&root, Arc::new(StubFactory(registry)));

        let first = composer.compose(&registry_request()).await.unwrap();
        let second = composer.compose(&registry_request()).await.unwrap();
        assert_eq!(first.to_yaml().unwrap(), second.to_yaml().unwrap());
    }

    #[tokio::test]
    async fn test_one_entry_per_image() {
        let root = tempfile::tempdir().unwrap();
        let composer = composer(&root, Arc::new(ForbiddenFactory));

        let names = ["a", "b", "c", "d", "e"];
        let mut request = demo_request("test", "v1");
        request.config.images = names.iter().map(|n| ImageDef::new(*n)).collect();

        let values = composer.compose(&request).await.unwrap();
        assert_eq!(values.images.len(), names.len());
        assert_eq!(values.images.names().collect::<Vec<_>>(), names.to_vec());
    }

    #[tokio::test]
    async fn test_git_provenance_drives_default_tag() {
        let root = tempfile::tempdir().unwrap();
        let authenticator =
            RegistryAuthenticator::new(Arc::new(ForbiddenFactory)).with_docker_config_dir(None);
        let composer = Composer::new(
            workspace(&root),
            authenticator,
            Arc::new(FixedProvenance(Some(GitInfo::on_branch(
                Some("abc1234".to_string()),
                "feature/login",
            )))),
        );

        let mut request = demo_request("test", "");
        request.target.tag = TagOptions::default();

        let values = composer.compose(&request).await.unwrap();
        assert_eq!(values.tag, "feature-login");
        assert!(values.git.git().unwrap().is_branch);
    }
}
