//! Helm deploy helpers
//!
//! `get-service-values` prints the document Helm charts receive at deploy
//! time. Stdout carries only the YAML document.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::cli::GetServiceValuesArgs;
use crate::config::load_project_config;
use crate::domain::{CiEnv, ServiceValues};
use crate::error::ComposeError;
use crate::infrastructure::{GitClient, RegistryAuthenticator, SkopeoClientFactory, Workspace};
use crate::services::{ComposeRequest, Composer};

/// Compose the service values and print them as YAML on stdout.
pub async fn get_service_values(args: GetServiceValuesArgs) -> Result<()> {
    let values = compose_values(&args)
        .await
        .context("get-service-values failed")?;

    let yaml = values
        .to_yaml()
        .context("get-service-values failed: cannot serialize service values")?;
    print!("{}", yaml);
    Ok(())
}

/// Wire real collaborators and run the composer.
async fn compose_values(args: &GetServiceValuesArgs) -> Result<ServiceValues, ComposeError> {
    let workspace = Workspace::init(args.tmp_dir.clone())?;
    let config = load_project_config(&args.dir, args.config.as_deref())?;
    info!("Loaded project {} with {} image(s)", config.project, config.images.len());

    let composer = Composer::new(
        workspace,
        RegistryAuthenticator::new(Arc::new(SkopeoClientFactory)),
        Arc::new(GitClient::in_dir(&args.dir)),
    );

    let request = ComposeRequest {
        config,
        images_repo: args.images_repo.clone(),
        credentials: args.credentials(),
        target: args.target(),
        ci: CiEnv::from_env(),
    };

    composer.compose(&request).await
}
