//! Project configuration: project identity and declared images.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use super::deploy::DeployConfig;
use crate::error::ConfigError;

/// A single declared image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDef {
    /// Image name, used as the key in service values (e.g., "web", "worker")
    pub name: String,

    /// Build context relative to the project directory
    #[serde(default)]
    pub context: Option<PathBuf>,

    /// Dockerfile relative to the build context
    #[serde(default)]
    pub dockerfile: Option<PathBuf>,
}

#[cfg(test)]
impl ImageDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: None,
            dockerfile: None,
        }
    }
}

/// Parsed `deckhand.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (e.g., "demo")
    pub project: String,

    /// Images in declaration order
    #[serde(default)]
    pub images: Vec<ImageDef>,

    /// Deploy settings: namespace templates and tag default
    #[serde(default)]
    pub deploy: DeployConfig,
}

#[cfg(test)]
impl ProjectConfig {
    pub fn new(project: impl Into<String>, images: Vec<ImageDef>) -> Self {
        Self {
            project: project.into(),
            images,
            deploy: DeployConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Check the invariants the composer relies on.
    ///
    /// Image names must be non-empty and unique so that every image maps
    /// to exactly one entry in the values document.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "project".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for image in &self.images {
            if image.name.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "images[].name".to_string(),
                });
            }
            if !seen.insert(image.name.as_str()) {
                return Err(ConfigError::DuplicateImage {
                    name: image.name.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_ordered_images() {
        let config = ProjectConfig::new("demo", vec![ImageDef::new("web"), ImageDef::new("worker")]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_images() {
        let config = ProjectConfig::new("demo", vec![ImageDef::new("web"), ImageDef::new("web")]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateImage { name }) if name == "web"
        ));
    }

    #[test]
    fn test_validate_rejects_blank_project() {
        let config = ProjectConfig::new("  ", vec![]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { .. })
        ));
    }
}
