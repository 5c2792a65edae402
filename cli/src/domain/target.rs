//! Deploy target: tag, namespace and environment resolved together

use super::ci::CiEnv;
use super::namespace::{resolve_environment, resolve_namespace};
use super::tag::{resolve_tag, TagOptions};
use super::values::Provenance;
use crate::config::ProjectConfig;
use crate::error::ConfigError;

/// Where and under which tag a deployment goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    pub tag: String,
    pub namespace: String,
    pub environment: String,
}

/// Inputs that come from flags
#[derive(Debug, Clone, Default)]
pub struct TargetOptions {
    pub tag: TagOptions,
    pub namespace: Option<String>,
    pub environment: Option<String>,
}

/// Resolve tag, namespace and environment. No I/O.
pub fn resolve_target(
    options: &TargetOptions,
    config: &ProjectConfig,
    provenance: &Provenance,
    ci: &CiEnv,
) -> Result<DeployTarget, ConfigError> {
    let environment = resolve_environment(options.environment.as_deref());
    let namespace = resolve_namespace(options.namespace.as_deref(), &environment, config)?;
    let tag = resolve_tag(
        &options.tag,
        config.deploy.default_tag.as_deref(),
        provenance,
        ci,
    )?;

    Ok(DeployTarget {
        tag,
        namespace,
        environment,
    })
}
