//! Service values builder
//!
//! Resolves every image getter once, in order, and assembles the document.
//! The first resolution error aborts the build; no partial document is
//! returned.

use tracing::debug;

use super::image_info::ImageInfoGetter;
use crate::domain::{DeployTarget, ImageValues, Provenance, ServiceValues};
use crate::error::ServiceValuesError;

/// Everything except images that goes into the document
#[derive(Debug, Clone)]
pub struct ValuesHeader<'a> {
    pub project: &'a str,
    /// Registry path, or the `IMAGES_REPO` placeholder
    pub registry: &'a str,
    pub target: &'a DeployTarget,
    pub provenance: Provenance,
}

pub async fn build_service_values(
    header: ValuesHeader<'_>,
    getters: Vec<(String, ImageInfoGetter)>,
) -> Result<ServiceValues, ServiceValuesError> {
    let mut images = ImageValues::default();

    for (name, getter) in getters {
        let info = getter
            .resolve()
            .await
            .map_err(|source| ServiceValuesError {
                image: name.clone(),
                source,
            })?;
        debug!("Resolved {} -> {}", name, info.image);
        images.push(name, info);
    }

    Ok(ServiceValues {
        project: header.project.to_string(),
        registry: header.registry.to_string(),
        environment: header.target.environment.clone(),
        namespace: header.target.namespace.clone(),
        tag: header.target.tag.clone(),
        images,
        git: header.provenance,
    })
}
