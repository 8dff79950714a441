//! Mock gallery client for unit testing
//!
//! This module provides a mock implementation of every gallery API trait that
//! can be used in tests without reaching ARM.
//!
//! - Listings are stored as explicit pages so page boundaries can be tested.
//! - Every call is counted per [`MockOperation`] so tests can assert how many
//!   remote round-trips a resolution made.
//! - Failures can be injected per operation, optionally on a single page.

mod helpers;

pub use helpers::*;

use crate::common::Page;
use crate::error::GalleryError;
use crate::gallery_trait::*;
use crate::models::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const NEXT_LINK_PREFIX: &str = "mock://page/";

/// Remote operations the mock records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    ListCommunityImageVersions,
    ListNodeImageVersions,
    GetGalleryImageVersion,
    ListGalleryImageVersions,
    CreateGalleryClient,
}

#[derive(Debug, Clone)]
struct MockFailure {
    /// Fail only when this page index is requested; every call otherwise
    page: Option<usize>,
    message: String,
}

/// Mock gallery client for testing
///
/// Cloning shares the underlying state, so a test can keep a handle for
/// assertions while the resolver owns another.
#[derive(Debug, Clone, Default)]
pub struct MockGalleryClient {
    community_pages: Arc<Mutex<HashMap<(String, String), Vec<Vec<CommunityGalleryImageVersion>>>>>,
    node_image_versions: Arc<Mutex<Vec<NodeImageVersion>>>,
    // Keyed by (subscription, resource group, gallery, image)
    gallery_pages: Arc<Mutex<HashMap<(String, String, String, String), Vec<Vec<GalleryImageVersion>>>>>,
    failures: Arc<Mutex<HashMap<MockOperation, MockFailure>>>,
    calls: Arc<Mutex<HashMap<MockOperation, usize>>>,
    subscriptions: Arc<Mutex<Vec<String>>>,
    bound_subscription: Option<String>,
}

impl MockGalleryClient {
    /// Create a new, empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pages returned for a community image listing (for test setup)
    pub fn set_community_versions(
        &self,
        public_gallery_name: &str,
        image_name: &str,
        pages: Vec<Vec<CommunityGalleryImageVersion>>,
    ) {
        self.community_pages
            .lock()
            .unwrap()
            .insert((public_gallery_name.to_string(), image_name.to_string()), pages);
    }

    /// Set the node image version list (for test setup)
    pub fn set_node_image_versions(&self, versions: Vec<NodeImageVersion>) {
        *self.node_image_versions.lock().unwrap() = versions;
    }

    /// Set the pages of versions for a gallery image (for test setup)
    pub fn set_gallery_image_versions(
        &self,
        subscription_id: &str,
        resource_group: &str,
        gallery_name: &str,
        image_name: &str,
        pages: Vec<Vec<GalleryImageVersion>>,
    ) {
        self.gallery_pages.lock().unwrap().insert(
            (
                subscription_id.to_string(),
                resource_group.to_string(),
                gallery_name.to_string(),
                image_name.to_string(),
            ),
            pages,
        );
    }

    /// Make every call of `operation` fail
    pub fn fail_on(&self, operation: MockOperation, message: impl Into<String>) {
        self.failures.lock().unwrap().insert(
            operation,
            MockFailure {
                page: None,
                message: message.into(),
            },
        );
    }

    /// Make `operation` fail only when page `page` (0-based) is requested
    pub fn fail_on_page(&self, operation: MockOperation, page: usize, message: impl Into<String>) {
        self.failures.lock().unwrap().insert(
            operation,
            MockFailure {
                page: Some(page),
                message: message.into(),
            },
        );
    }

    /// Remove any injected failure for `operation`
    pub fn clear_failure(&self, operation: MockOperation) {
        self.failures.lock().unwrap().remove(&operation);
    }

    /// Number of times `operation` was invoked
    pub fn call_count(&self, operation: MockOperation) -> usize {
        self.calls.lock().unwrap().get(&operation).copied().unwrap_or(0)
    }

    /// Subscriptions gallery clients were requested for, in order
    pub fn requested_subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }

    fn record(&self, operation: MockOperation) {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;
    }

    fn check_failure(&self, operation: MockOperation, page: usize) -> Result<(), GalleryError> {
        match self.failures.lock().unwrap().get(&operation) {
            Some(failure) if failure.page.is_none_or(|p| p == page) => Err(GalleryError::Api {
                status: 500,
                message: failure.message.clone(),
            }),
            _ => Ok(()),
        }
    }

    fn bound_subscription(&self) -> &str {
        self.bound_subscription.as_deref().unwrap_or_default()
    }
}

fn page_index(next_link: Option<&str>) -> Result<usize, GalleryError> {
    match next_link {
        None => Ok(0),
        Some(link) => link
            .strip_prefix(NEXT_LINK_PREFIX)
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| GalleryError::InvalidRequest(format!("unexpected next link {}", link))),
    }
}

fn take_page<T: Clone>(pages: Option<&Vec<Vec<T>>>, index: usize) -> Page<T> {
    let Some(pages) = pages else {
        return Page::last(Vec::new());
    };
    let value = pages.get(index).cloned().unwrap_or_default();
    let next_link = (index + 1 < pages.len()).then(|| format!("{}{}", NEXT_LINK_PREFIX, index + 1));
    Page { value, next_link }
}

#[async_trait::async_trait]
impl CommunityGalleryImageVersionsApi for MockGalleryClient {
    async fn list_community_image_versions(
        &self,
        _location: &str,
        public_gallery_name: &str,
        image_name: &str,
        next_link: Option<&str>,
    ) -> Result<Page<CommunityGalleryImageVersion>, GalleryError> {
        self.record(MockOperation::ListCommunityImageVersions);
        let index = page_index(next_link)?;
        self.check_failure(MockOperation::ListCommunityImageVersions, index)?;
        let pages = self.community_pages.lock().unwrap();
        Ok(take_page(
            pages.get(&(public_gallery_name.to_string(), image_name.to_string())),
            index,
        ))
    }
}

#[async_trait::async_trait]
impl NodeImageVersionsApi for MockGalleryClient {
    async fn list_node_image_versions(
        &self,
        _location: &str,
        _subscription_id: &str,
    ) -> Result<NodeImageVersionsResponse, GalleryError> {
        self.record(MockOperation::ListNodeImageVersions);
        self.check_failure(MockOperation::ListNodeImageVersions, 0)?;
        Ok(NodeImageVersionsResponse {
            values: self.node_image_versions.lock().unwrap().clone(),
        })
    }
}

#[async_trait::async_trait]
impl GalleryImageVersionsApi for MockGalleryClient {
    async fn get_gallery_image_version(
        &self,
        resource_group: &str,
        gallery_name: &str,
        image_name: &str,
        version: &str,
    ) -> Result<GalleryImageVersion, GalleryError> {
        self.record(MockOperation::GetGalleryImageVersion);
        self.check_failure(MockOperation::GetGalleryImageVersion, 0)?;
        let key = (
            self.bound_subscription().to_string(),
            resource_group.to_string(),
            gallery_name.to_string(),
            image_name.to_string(),
        );
        self.gallery_pages
            .lock()
            .unwrap()
            .get(&key)
            .and_then(|pages| {
                pages
                    .iter()
                    .flatten()
                    .find(|v| v.name.as_deref() == Some(version))
                    .cloned()
            })
            .ok_or_else(|| {
                GalleryError::NotFound(format!(
                    "gallery image version {}/{}/{} not found",
                    gallery_name, image_name, version
                ))
            })
    }

    async fn list_gallery_image_versions(
        &self,
        resource_group: &str,
        gallery_name: &str,
        image_name: &str,
        next_link: Option<&str>,
    ) -> Result<Page<GalleryImageVersion>, GalleryError> {
        self.record(MockOperation::ListGalleryImageVersions);
        let index = page_index(next_link)?;
        self.check_failure(MockOperation::ListGalleryImageVersions, index)?;
        let key = (
            self.bound_subscription().to_string(),
            resource_group.to_string(),
            gallery_name.to_string(),
            image_name.to_string(),
        );
        let pages = self.gallery_pages.lock().unwrap();
        Ok(take_page(pages.get(&key), index))
    }
}

#[async_trait::async_trait]
impl GalleryClientFactory for MockGalleryClient {
    async fn gallery_image_versions_client(
        &self,
        subscription_id: &str,
    ) -> Result<Arc<dyn GalleryImageVersionsApi>, GalleryError> {
        self.record(MockOperation::CreateGalleryClient);
        self.check_failure(MockOperation::CreateGalleryClient, 0)?;
        self.subscriptions.lock().unwrap().push(subscription_id.to_string());
        let mut bound = self.clone();
        bound.bound_subscription = Some(subscription_id.to_string());
        Ok(Arc::new(bound))
    }
}
