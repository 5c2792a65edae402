//! Per-image info getters
//!
//! Getters are wired here and resolved later by the service values builder.
//! Construction never touches the registry.

use std::sync::Arc;
use tracing::debug;

use crate::config::ImageDef;
use crate::domain::{ImageInfo, RegistryMode};
use crate::error::ImageInfoError;
use crate::infrastructure::RegistryClient;

/// Lazy accessor for one image's info
pub enum ImageInfoGetter {
    /// Reference under the configured registry; digest looked up on resolve
    WithRegistry {
        repository: String,
        tag: String,
        client: Arc<dyn RegistryClient>,
    },
    /// Placeholder reference, never leaves the process
    WithoutRegistry { repository: String, tag: String },
}

impl ImageInfoGetter {
    pub fn reference(&self) -> String {
        match self {
            Self::WithRegistry {
                repository, tag, ..
            }
            | Self::WithoutRegistry { repository, tag } => format!("{}:{}", repository, tag),
        }
    }

    pub async fn resolve(&self) -> Result<ImageInfo, ImageInfoError> {
        let image = self.reference();
        match self {
            Self::WithRegistry {
                repository,
                tag,
                client,
            } => {
                debug!("Resolving digest of {}", image);
                let digest = client.image_digest(&image).await?;
                Ok(ImageInfo {
                    image,
                    repository: repository.clone(),
                    tag: tag.clone(),
                    digest: Some(digest),
                })
            }
            Self::WithoutRegistry { repository, tag } => Ok(ImageInfo {
                image,
                repository: repository.clone(),
                tag: tag.clone(),
                digest: None,
            }),
        }
    }
}

impl std::fmt::Debug for ImageInfoGetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self {
            Self::WithRegistry { .. } => "with-registry",
            Self::WithoutRegistry { .. } => "without-registry",
        };
        f.debug_struct("ImageInfoGetter")
            .field("mode", &mode)
            .field("reference", &self.reference())
            .finish()
    }
}

/// Build one getter per image, in configuration order.
///
/// `client` is present exactly when `registry` is `WithRegistry`; it decides
/// whether getters look digests up.
pub fn build_getters(
    images: &[ImageDef],
    tag: &str,
    registry: &RegistryMode,
    client: Option<&Arc<dyn RegistryClient>>,
) -> Vec<(String, ImageInfoGetter)> {
    images
        .iter()
        .map(|image| {
            let repository = registry.repository(&image.name);
            let tag = tag.to_string();
            let getter = match client {
                Some(client) => ImageInfoGetter::WithRegistry {
                    repository,
                    tag,
                    client: Arc::clone(client),
                },
                None => ImageInfoGetter::WithoutRegistry { repository, tag },
            };
            (image.name.clone(), getter)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use crate::infrastructure::registry::RegistryCredentials;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingRegistry {
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl RegistryClient for CountingRegistry {
        async fn login(
            &self,
            _registry_path: &str,
            _credentials: Option<&RegistryCredentials>,
        ) -> Result<(), AuthError> {
            Ok(())
        }

        async fn image_digest(&self, reference: &str) -> Result<String, ImageInfoError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(format!("sha256:{}", reference.len()))
        }
    }

    fn images() -> Vec<ImageDef> {
        vec![ImageDef::new("web"), ImageDef::new("worker")]
    }

    #[test]
    fn test_without_registry_uses_placeholder() {
        let getters = build_getters(&images(), "v1", &RegistryMode::WithoutRegistry, None);
        let refs: Vec<(String, String)> = getters
            .iter()
            .map(|(name, g)| (name.clone(), g.reference()))
            .collect();
        assert_eq!(
            refs,
            vec![
                ("web".to_string(), "IMAGES_REPO/web:v1".to_string()),
                ("worker".to_string(), "IMAGES_REPO/worker:v1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_construction_does_not_resolve() {
        let registry = Arc::new(CountingRegistry::default());
        let client: Arc<dyn RegistryClient> = registry.clone();
        let mode = RegistryMode::from_path("registry.example.com/demo");

        let getters = build_getters(&images(), "v1", &mode, Some(&client));
        assert_eq!(registry.lookups.load(Ordering::SeqCst), 0);

        let info = getters[0].1.resolve().await.unwrap();
        assert_eq!(registry.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(info.image, "registry.example.com/demo/web:v1");
        assert_eq!(info.repository, "registry.example.com/demo/web");
        assert!(info.digest.is_some());
    }

    #[tokio::test]
    async fn test_without_registry_resolves_without_digest() {
        let getters = build_getters(&images(), "v1", &RegistryMode::WithoutRegistry, None);
        let info = getters[1].1.resolve().await.unwrap();
        assert_eq!(info.digest, None);
        assert_eq!(info.tag, "v1");
    }
}
