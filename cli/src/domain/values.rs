//! Service values document
//!
//! The canonical structure handed to the chart-rendering stage.
//! Field order here is the field order of the emitted YAML.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Resolved identity of one image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    /// Full reference, `<repository>:<tag>`
    pub image: String,
    pub repository: String,
    pub tag: String,
    /// Content digest, only known when resolved through a registry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Source-control metadata attached to a deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub branch: Option<String>,
    pub tag: Option<String>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub is_branch: bool,
    pub is_tag: bool,
}

impl GitInfo {
    pub fn on_branch(commit: Option<String>, branch: impl Into<String>) -> Self {
        let branch = branch.into();
        Self {
            commit,
            git_ref: Some(branch.clone()),
            branch: Some(branch),
            tag: None,
            is_branch: true,
            is_tag: false,
        }
    }

    pub fn on_tag(commit: Option<String>, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            commit,
            git_ref: Some(tag.clone()),
            branch: None,
            tag: Some(tag),
            is_branch: false,
            is_tag: true,
        }
    }

    /// Detached HEAD with no tag pointing at it
    pub fn detached(commit: Option<String>) -> Self {
        Self {
            commit,
            ..Default::default()
        }
    }
}

/// Git provenance, best-effort
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    Known(GitInfo),
    Unknown,
}

impl Provenance {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn git(&self) -> Option<&GitInfo> {
        match self {
            Provenance::Known(info) => Some(info),
            Provenance::Unknown => None,
        }
    }
}

impl Serialize for Provenance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Provenance::Known(info) => info.serialize(serializer),
            Provenance::Unknown => serializer.serialize_str(Self::UNKNOWN),
        }
    }
}

/// Image name -> info, iterated in configuration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageValues(Vec<(String, ImageInfo)>);

impl ImageValues {
    pub fn push(&mut self, name: impl Into<String>, info: ImageInfo) {
        self.0.push((name.into(), info));
    }
}

#[cfg(test)]
impl ImageValues {
    pub fn get(&self, name: &str) -> Option<&ImageInfo> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, info)| info)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ImageValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, info) in &self.0 {
            map.serialize_entry(name, info)?;
        }
        map.end()
    }
}

/// The values document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceValues {
    pub project: String,
    pub registry: String,
    pub environment: String,
    pub namespace: String,
    pub tag: String,
    pub images: ImageValues,
    pub git: Provenance,
}

impl ServiceValues {
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
