//! Custom gallery image resolution.

use super::Newest;
use crate::error::ImageError;
use crds::CustomImageTerm;
use gallery_client::{GalleryClientFactory, GalleryImageVersion, GalleryImageVersionsApi};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Cache key for a custom image term; the version segment is empty when unpinned
pub fn custom_image_key(term: &CustomImageTerm) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Compute/galleries/{}/images/{}/versions/{}",
        term.gallery_subscription_id,
        term.gallery_resource_group_name,
        term.gallery_name,
        term.name,
        term.version.as_deref().unwrap_or_default()
    )
}

/// Resolves user-supplied gallery images, possibly in another subscription
pub struct CustomResolver {
    factory: Arc<dyn GalleryClientFactory>,
}

impl fmt::Debug for CustomResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomResolver").finish_non_exhaustive()
    }
}

impl CustomResolver {
    pub fn new(factory: Arc<dyn GalleryClientFactory>) -> Self {
        Self { factory }
    }

    /// Resource ID of the pinned version, or of the most recently published one
    pub async fn resolve(&self, term: &CustomImageTerm) -> Result<String, ImageError> {
        let client = self
            .factory
            .gallery_image_versions_client(&term.gallery_subscription_id)
            .await
            .map_err(|source| ImageError::ClientConstruction {
                subscription_id: term.gallery_subscription_id.clone(),
                source,
            })?;

        let version = match term.pinned_version() {
            Some(version) => {
                client
                    .get_gallery_image_version(
                        &term.gallery_resource_group_name,
                        &term.gallery_name,
                        &term.name,
                        version,
                    )
                    .await?
            }
            None => latest_version(client.as_ref(), term).await?,
        };

        version.id.ok_or_else(|| ImageError::MissingImageId {
            image: format!("{}/{}", term.gallery_name, term.name),
        })
    }
}

async fn latest_version(
    client: &dyn GalleryImageVersionsApi,
    term: &CustomImageTerm,
) -> Result<GalleryImageVersion, ImageError> {
    let mut newest = Newest::default();
    let mut next_link: Option<String> = None;
    loop {
        let page = client
            .list_gallery_image_versions(
                &term.gallery_resource_group_name,
                &term.gallery_name,
                &term.name,
                next_link.as_deref(),
            )
            .await?;
        for version in page.value {
            let published = version.published_date();
            newest.offer(version, published);
        }
        match page.next_link {
            Some(link) => next_link = Some(link),
            None => break,
        }
    }

    let version = newest.into_inner().ok_or_else(|| ImageError::NoImageVersions {
        image: format!("{}/{}", term.gallery_name, term.name),
    })?;
    debug!(
        gallery = %term.gallery_name,
        image = %term.name,
        version = version.name.as_deref().unwrap_or_default(),
        "resolved latest custom image version"
    );
    Ok(version)
}
