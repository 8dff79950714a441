//! Gallery API traits for mocking
//!
//! Each remote surface the image resolver depends on is a separate trait so
//! resolvers only hold the capability they need. The concrete [`ArmClient`]
//! implements all of them; tests use [`MockGalleryClient`].
//!
//! Listing calls are page-at-a-time: callers pass `None` for the first page
//! and the previous page's `next_link` to continue.
//!
//! [`ArmClient`]: crate::client::ArmClient
//! [`MockGalleryClient`]: crate::mock::MockGalleryClient

use crate::common::Page;
use crate::error::GalleryError;
use crate::models::*;
use std::sync::Arc;

/// Public (community) gallery image version listing
#[async_trait::async_trait]
pub trait CommunityGalleryImageVersionsApi: Send + Sync {
    async fn list_community_image_versions(
        &self,
        location: &str,
        public_gallery_name: &str,
        image_name: &str,
        next_link: Option<&str>,
    ) -> Result<Page<CommunityGalleryImageVersion>, GalleryError>;
}

/// AKS node image version list, scoped to a location and subscription
#[async_trait::async_trait]
pub trait NodeImageVersionsApi: Send + Sync {
    async fn list_node_image_versions(
        &self,
        location: &str,
        subscription_id: &str,
    ) -> Result<NodeImageVersionsResponse, GalleryError>;
}

/// Compute gallery image versions within one subscription
#[async_trait::async_trait]
pub trait GalleryImageVersionsApi: Send + Sync {
    async fn get_gallery_image_version(
        &self,
        resource_group: &str,
        gallery_name: &str,
        image_name: &str,
        version: &str,
    ) -> Result<GalleryImageVersion, GalleryError>;

    async fn list_gallery_image_versions(
        &self,
        resource_group: &str,
        gallery_name: &str,
        image_name: &str,
        next_link: Option<&str>,
    ) -> Result<Page<GalleryImageVersion>, GalleryError>;
}

/// Builds gallery clients bound to an arbitrary subscription
///
/// Custom images may live in a different subscription than the cluster, so a
/// client is established per lookup.
#[async_trait::async_trait]
pub trait GalleryClientFactory: Send + Sync {
    async fn gallery_image_versions_client(
        &self,
        subscription_id: &str,
    ) -> Result<Arc<dyn GalleryImageVersionsApi>, GalleryError>;
}
