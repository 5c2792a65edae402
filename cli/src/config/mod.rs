//! # Project Configuration
//!
//! Reads `deckhand.yaml` from the project directory.
//!
//! ## Example
//!
//! ```yaml
//! project: demo
//! images:
//!   - name: web
//!     context: ./web
//!   - name: worker
//! deploy:
//!   namespace: "[[ project ]]-[[ env ]]"
//!   environments:
//!     production:
//!       namespace: demo
//! ```
//!
//! Parsing happens once per invocation; the result is immutable.

pub mod deploy;
pub mod project;

pub use project::{ImageDef, ProjectConfig};

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;

/// Config file names searched in the project directory, in order
const CONFIG_FILE_NAMES: [&str; 2] = ["deckhand.yaml", "deckhand.yml"];

/// Locate the project config file.
///
/// An explicit path wins; otherwise the project directory is searched.
pub fn find_config_file(project_dir: &Path, explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_dir.join(path)
        };
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    CONFIG_FILE_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|path| path.exists())
        .ok_or_else(|| ConfigError::FileNotFound {
            path: project_dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
}

/// Load and validate the project config.
pub fn load_project_config(
    project_dir: &Path,
    explicit: Option<&Path>,
) -> Result<ProjectConfig, ConfigError> {
    let path = find_config_file(project_dir, explicit)?;
    debug!("Loading project config from {}", path.display());

    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let config: ProjectConfig =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    config.validate()?;
    Ok(config)
}
