//! Container registry operations
//!
//! Login and digest lookup through `skopeo`, with all credentials kept in an
//! auth file inside the invocation's working directory. The home credential
//! store is never written.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::domain::image::registry_host;
use crate::error::{AuthError, ImageInfoError};
use crate::tools::{get_tool_path, tools};

/// Auth file name inside the working directory (docker config.json format)
pub const AUTH_FILE_NAME: &str = "config.json";

/// Registry credentials for authentication
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
}

impl RegistryCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registry operations needed by the composer
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Log in to the registry hosting `registry_path`.
    ///
    /// `None` means reuse whatever credentials the bound store already has.
    async fn login(
        &self,
        registry_path: &str,
        credentials: Option<&RegistryCredentials>,
    ) -> Result<(), AuthError>;

    /// Content digest of `reference` (e.g., `sha256:...`)
    async fn image_digest(&self, reference: &str) -> Result<String, ImageInfoError>;
}

/// Builds registry clients bound to a working directory
pub trait RegistryClientFactory: Send + Sync {
    fn bind(&self, workdir: &Path) -> Arc<dyn RegistryClient>;
}

/// `skopeo inspect` output, only the fields we read
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectOutput {
    digest: String,
}

/// Registry client backed by the skopeo CLI
pub struct SkopeoClient {
    auth_file: PathBuf,
}

impl SkopeoClient {
    /// Create a client whose credentials live in `workdir`
    pub fn new(workdir: &Path) -> Self {
        Self {
            auth_file: workdir.join(AUTH_FILE_NAME),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(get_tool_path(tools::SKOPEO));
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl RegistryClient for SkopeoClient {
    async fn login(
        &self,
        registry_path: &str,
        credentials: Option<&RegistryCredentials>,
    ) -> Result<(), AuthError> {
        let host = registry_host(&format!("{}/", registry_path));
        let failed = |message: String| AuthError::LoginFailed {
            registry: host.clone(),
            message,
        };

        let Some(credentials) = credentials else {
            debug!("No explicit credentials for {}, using seeded auth file", host);
            return Ok(());
        };

        let mut child = self
            .command()
            .arg("login")
            .arg("--authfile")
            .arg(&self.auth_file)
            .args(["--username", &credentials.username, "--password-stdin", &host])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(format!("cannot run skopeo: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(credentials.password.as_bytes())
                .await
                .map_err(|e| failed(format!("cannot pass password to skopeo: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| failed(format!("skopeo login failed: {}", e)))?;

        if !output.status.success() {
            return Err(failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        debug!("Logged in to {}", host);
        Ok(())
    }

    async fn image_digest(&self, reference: &str) -> Result<String, ImageInfoError> {
        let registry = registry_host(reference);
        let unavailable = |message: String| ImageInfoError::RegistryUnavailable {
            registry: registry.clone(),
            message,
        };

        let mut cmd = self.command();
        cmd.arg("inspect").arg("--no-tags");
        if self.auth_file.exists() {
            cmd.arg("--authfile").arg(&self.auth_file);
        }
        let output = cmd
            .arg(format!("docker://{}", reference))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| unavailable(format!("cannot run skopeo: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_inspect_error(reference, &registry, stderr.trim()));
        }

        let inspected: InspectOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| unavailable(format!("unexpected skopeo output: {}", e)))?;
        Ok(inspected.digest)
    }
}

/// Factory for [`SkopeoClient`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SkopeoClientFactory;

impl RegistryClientFactory for SkopeoClientFactory {
    fn bind(&self, workdir: &Path) -> Arc<dyn RegistryClient> {
        Arc::new(SkopeoClient::new(workdir))
    }
}

/// Map skopeo's stderr onto not-found vs. unavailable
fn classify_inspect_error(reference: &str, registry: &str, stderr: &str) -> ImageInfoError {
    let lower = stderr.to_lowercase();
    if lower.contains("manifest unknown")
        || lower.contains("not found")
        || lower.contains("name unknown")
        || lower.contains("404")
    {
        ImageInfoError::NotFound {
            reference: reference.to_string(),
        }
    } else {
        ImageInfoError::RegistryUnavailable {
            registry: registry.to_string(),
            message: stderr.to_string(),
        }
    }
}
