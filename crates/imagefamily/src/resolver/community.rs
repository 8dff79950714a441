//! Community gallery resolution.

use super::Newest;
use crate::error::ImageError;
use gallery_client::CommunityGalleryImageVersionsApi;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Community gallery image reference
pub fn community_image_id(public_gallery_url: &str, image_definition: &str, version: &str) -> String {
    format!(
        "/CommunityGalleries/{}/images/{}/versions/{}",
        public_gallery_url, image_definition, version
    )
}

/// Finds the newest published version of a community gallery image
pub struct CommunityResolver {
    client: Arc<dyn CommunityGalleryImageVersionsApi>,
    location: String,
}

impl fmt::Debug for CommunityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommunityResolver")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl CommunityResolver {
    pub fn new(client: Arc<dyn CommunityGalleryImageVersionsApi>, location: impl Into<String>) -> Self {
        Self {
            client,
            location: location.into(),
        }
    }

    /// Image reference for the newest version of `image_definition`.
    ///
    /// An image with no versions yields a reference with an empty version
    /// segment.
    pub async fn resolve(&self, public_gallery_url: &str, image_definition: &str) -> Result<String, ImageError> {
        let version = self.latest_version(public_gallery_url, image_definition).await?;
        Ok(community_image_id(public_gallery_url, image_definition, &version))
    }

    /// Name of the most recently published version, or empty when there is none
    pub async fn latest_version(&self, public_gallery_url: &str, image_definition: &str) -> Result<String, ImageError> {
        let mut newest = Newest::default();
        let mut next_link: Option<String> = None;
        let mut pages = 0usize;
        loop {
            let page = self
                .client
                .list_community_image_versions(&self.location, public_gallery_url, image_definition, next_link.as_deref())
                .await?;
            pages += 1;
            for version in page.value {
                let published = version.published_date();
                newest.offer(version, published);
            }
            match page.next_link {
                Some(link) => next_link = Some(link),
                None => break,
            }
        }

        let version = newest.into_inner().and_then(|v| v.name).unwrap_or_default();
        debug!(
            gallery = %public_gallery_url,
            image = %image_definition,
            version = %version,
            pages,
            "resolved community image version"
        );
        Ok(version)
    }
}
