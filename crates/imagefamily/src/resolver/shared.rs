//! AKS shared image gallery resolution.

use crate::error::ImageError;
use crate::family::DefaultImageDescriptor;
use gallery_client::NodeImageVersionsApi;
use std::fmt;
use std::sync::Arc;

/// Shared gallery image version resource ID
pub fn shared_image_id(
    subscription_id: &str,
    resource_group: &str,
    gallery_name: &str,
    image_definition: &str,
    version: &str,
) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Compute/galleries/{}/images/{}/versions/{}",
        subscription_id, resource_group, gallery_name, image_definition, version
    )
}

/// Looks up the current shared gallery version of a default image by SKU
pub struct SharedResolver {
    client: Arc<dyn NodeImageVersionsApi>,
    location: String,
    subscription_id: String,
    sig_subscription_id: String,
}

impl fmt::Debug for SharedResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedResolver")
            .field("location", &self.location)
            .field("subscription_id", &self.subscription_id)
            .field("sig_subscription_id", &self.sig_subscription_id)
            .finish_non_exhaustive()
    }
}

impl SharedResolver {
    /// `subscription_id` scopes the version list; `sig_subscription_id` owns the galleries
    pub fn new(
        client: Arc<dyn NodeImageVersionsApi>,
        location: impl Into<String>,
        subscription_id: impl Into<String>,
        sig_subscription_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            location: location.into(),
            subscription_id: subscription_id.into(),
            sig_subscription_id: sig_subscription_id.into(),
        }
    }

    /// Resource ID of the listed version whose SKU equals the descriptor's image definition.
    ///
    /// The first matching record wins; the list is taken as already ordered.
    pub async fn resolve(&self, image: &DefaultImageDescriptor) -> Result<String, ImageError> {
        let versions = self
            .client
            .list_node_image_versions(&self.location, &self.subscription_id)
            .await?;
        versions
            .values
            .iter()
            .find(|v| v.sku == image.image_definition)
            .map(|v| {
                shared_image_id(
                    &self.sig_subscription_id,
                    &image.gallery_resource_group,
                    &image.gallery_name,
                    &image.image_definition,
                    &v.version,
                )
            })
            .ok_or_else(|| ImageError::NoMatchingVersion {
                image_definition: image.image_definition.clone(),
            })
    }
}
