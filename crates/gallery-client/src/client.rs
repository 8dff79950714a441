//! Azure Resource Manager client
//!
//! Implements the gallery API traits against the ARM REST endpoints:
//! - /subscriptions/{sub}/providers/Microsoft.Compute/locations/{loc}/communityGalleries/...
//! - /subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Compute/galleries/...
//! - /subscriptions/{sub}/providers/Microsoft.ContainerService/locations/{loc}/nodeImageVersions

use crate::common::{segment, HttpClient, Page, DEFAULT_ARM_ENDPOINT};
use crate::credential::{TokenCredential, ARM_SCOPE};
use crate::error::GalleryError;
use crate::gallery_trait::*;
use crate::models::*;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// API version for Microsoft.Compute gallery resources
pub const COMPUTE_GALLERY_API_VERSION: &str = "2023-07-03";

/// API version for the AKS node image version list
pub const NODE_IMAGE_VERSIONS_API_VERSION: &str = "2024-04-02-preview";

/// ARM client bound to one subscription
#[derive(Debug, Clone)]
pub struct ArmClient {
    http: HttpClient,
    subscription_id: String,
}

impl ArmClient {
    /// Create a new ARM client
    ///
    /// # Arguments
    /// * `endpoint` - ARM endpoint (e.g., "https://management.azure.com")
    /// * `subscription_id` - Subscription used for gallery lookups
    /// * `credential` - Token source for bearer authentication
    pub fn new(
        endpoint: String,
        subscription_id: String,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, GalleryError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Self::with_http_client(client, endpoint, subscription_id, credential)
    }

    /// Create a client sharing an existing `reqwest::Client`
    pub fn with_http_client(
        client: Client,
        endpoint: String,
        subscription_id: String,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self, GalleryError> {
        if subscription_id.trim().is_empty() {
            return Err(GalleryError::InvalidRequest("subscription ID must not be empty".to_string()));
        }
        Ok(Self {
            http: HttpClient::new(client, endpoint, credential),
            subscription_id,
        })
    }

    /// Subscription this client is bound to
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Get the ARM endpoint
    pub fn endpoint(&self) -> &str {
        self.http.endpoint()
    }

    fn gallery_image_path(
        &self,
        resource_group: &str,
        gallery_name: &str,
        image_name: &str,
    ) -> Result<String, GalleryError> {
        Ok(format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Compute/galleries/{}/images/{}/versions",
            segment("subscriptionId", &self.subscription_id)?,
            segment("resourceGroupName", resource_group)?,
            segment("galleryName", gallery_name)?,
            segment("galleryImageName", image_name)?,
        ))
    }
}

#[async_trait::async_trait]
impl CommunityGalleryImageVersionsApi for ArmClient {
    async fn list_community_image_versions(
        &self,
        location: &str,
        public_gallery_name: &str,
        image_name: &str,
        next_link: Option<&str>,
    ) -> Result<Page<CommunityGalleryImageVersion>, GalleryError> {
        let path = format!(
            "/subscriptions/{}/providers/Microsoft.Compute/locations/{}/communityGalleries/{}/images/{}/versions?api-version={}",
            segment("subscriptionId", &self.subscription_id)?,
            segment("location", location)?,
            segment("publicGalleryName", public_gallery_name)?,
            segment("galleryImageName", image_name)?,
            COMPUTE_GALLERY_API_VERSION,
        );
        debug!(
            "Listing community image versions for {}/{} in {}",
            public_gallery_name, image_name, location
        );
        self.http.get_page(&path, next_link).await
    }
}

#[async_trait::async_trait]
impl NodeImageVersionsApi for ArmClient {
    async fn list_node_image_versions(
        &self,
        location: &str,
        subscription_id: &str,
    ) -> Result<NodeImageVersionsResponse, GalleryError> {
        let path = format!(
            "/subscriptions/{}/providers/Microsoft.ContainerService/locations/{}/nodeImageVersions?api-version={}",
            segment("subscriptionId", subscription_id)?,
            segment("location", location)?,
            NODE_IMAGE_VERSIONS_API_VERSION,
        );
        debug!("Listing node image versions in {}", location);
        self.http.get(&path).await
    }
}

#[async_trait::async_trait]
impl GalleryImageVersionsApi for ArmClient {
    async fn get_gallery_image_version(
        &self,
        resource_group: &str,
        gallery_name: &str,
        image_name: &str,
        version: &str,
    ) -> Result<GalleryImageVersion, GalleryError> {
        let path = format!(
            "{}/{}?api-version={}",
            self.gallery_image_path(resource_group, gallery_name, image_name)?,
            segment("galleryImageVersionName", version)?,
            COMPUTE_GALLERY_API_VERSION,
        );
        debug!("Fetching gallery image version {}/{}/{}", gallery_name, image_name, version);
        self.http.get(&path).await
    }

    async fn list_gallery_image_versions(
        &self,
        resource_group: &str,
        gallery_name: &str,
        image_name: &str,
        next_link: Option<&str>,
    ) -> Result<Page<GalleryImageVersion>, GalleryError> {
        let path = format!(
            "{}?api-version={}",
            self.gallery_image_path(resource_group, gallery_name, image_name)?,
            COMPUTE_GALLERY_API_VERSION,
        );
        debug!("Listing gallery image versions for {}/{}", gallery_name, image_name);
        self.http.get_page(&path, next_link).await
    }
}

/// Builds [`ArmClient`]s for arbitrary subscriptions from one shared credential
#[derive(Clone)]
pub struct ArmClientFactory {
    client: Client,
    endpoint: String,
    credential: Arc<dyn TokenCredential>,
}

impl std::fmt::Debug for ArmClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClientFactory")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ArmClientFactory {
    pub fn new(client: Client, endpoint: String, credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            client,
            endpoint,
            credential,
        }
    }

    /// Factory against the public-cloud ARM endpoint
    pub fn public_cloud(client: Client, credential: Arc<dyn TokenCredential>) -> Self {
        Self::new(client, DEFAULT_ARM_ENDPOINT.to_string(), credential)
    }

    /// Build a client bound to `subscription_id`
    pub fn client_for(&self, subscription_id: &str) -> Result<ArmClient, GalleryError> {
        ArmClient::with_http_client(
            self.client.clone(),
            self.endpoint.clone(),
            subscription_id.to_string(),
            Arc::clone(&self.credential),
        )
    }
}

#[async_trait::async_trait]
impl GalleryClientFactory for ArmClientFactory {
    async fn gallery_image_versions_client(
        &self,
        subscription_id: &str,
    ) -> Result<Arc<dyn GalleryImageVersionsApi>, GalleryError> {
        // Establish the credential up front so auth problems surface before any lookup.
        self.credential.get_token(ARM_SCOPE).await?;
        Ok(Arc::new(self.client_for(subscription_id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticTokenCredential;

    fn client() -> ArmClient {
        ArmClient::new(
            "https://management.azure.com/".to_string(),
            "00000000-0000-0000-0000-000000000000".to_string(),
            Arc::new(StaticTokenCredential::new("token")),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_empty_subscription() {
        let result = ArmClient::new(
            DEFAULT_ARM_ENDPOINT.to_string(),
            " ".to_string(),
            Arc::new(StaticTokenCredential::new("token")),
        );
        assert!(matches!(result, Err(GalleryError::InvalidRequest(_))));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        assert_eq!(client().endpoint(), "https://management.azure.com");
    }

    #[test]
    fn test_gallery_image_path() {
        let path = client().gallery_image_path("my-rg", "myGallery", "myImage").unwrap();
        assert_eq!(
            path,
            "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/my-rg/providers/Microsoft.Compute/galleries/myGallery/images/myImage/versions"
        );
    }

    #[tokio::test]
    async fn test_factory_binds_subscription() {
        let factory = ArmClientFactory::public_cloud(Client::new(), Arc::new(StaticTokenCredential::new("token")));
        let client = factory.client_for("11111111-1111-1111-1111-111111111111").unwrap();
        assert_eq!(client.subscription_id(), "11111111-1111-1111-1111-111111111111");
        assert!(factory.gallery_image_versions_client("").await.is_err());
    }
}
