//! Deploy configuration for namespaces and tags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-environment overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Namespace template (supports: [[ project ]], [[ env ]])
    pub namespace: String,
}

/// Deploy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Default namespace template (supports: [[ project ]], [[ env ]])
    /// Used when the environment has no entry in `environments`
    #[serde(default)]
    pub namespace: Option<String>,

    /// Environment-specific settings (e.g., "staging", "production")
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,

    /// Tag used when no tag option is passed on the command line
    #[serde(default)]
    pub default_tag: Option<String>,
}

impl DeployConfig {
    /// Namespace template that applies to `environment`, if any is declared.
    pub fn namespace_template(&self, environment: &str) -> Option<&str> {
        self.environments
            .get(environment)
            .map(|env| env.namespace.as_str())
            .or(self.namespace.as_deref())
    }
}
