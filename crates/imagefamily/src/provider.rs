//! # Image Provider
//!
//! Entry point for image resolution. Given a node class and an instance type
//! it picks the image source, delegates to the matching gallery resolver and
//! caches what the resolver returns.
//!
//! Every remote lookup goes through [`Provider::cached`]: a cache hit returns
//! immediately, concurrent misses for one key share a single lookup, and only
//! successful results are stored.

use crate::cache::ExpiringCache;
use crate::change_monitor::ChangeMonitor;
use crate::error::ImageError;
use crate::family::{DefaultImageDescriptor, ImageFamily};
use crate::instance_type::InstanceType;
use crate::kube_version::{normalize_version, ServerVersionApi};
use crate::matcher;
use crate::options::Options;
use crate::resolver::custom::custom_image_key;
use crate::resolver::{CommunityResolver, CustomResolver, SharedResolver};
use crate::single_flight::KeyedLocks;
use crds::{AKSNodeClassSpec, CustomImageTerm, ImageSource};
use gallery_client::{CommunityGalleryImageVersionsApi, GalleryClientFactory, NodeImageVersionsApi};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

const KUBERNETES_VERSION_CACHE_KEY: &str = "kubernetesVersion";
const KUBERNETES_VERSION_CHANGE_KEY: &str = "kubernetes-version";

/// An image chosen for a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Distro identifier the node is bootstrapped as
    pub distro: String,
    /// Community gallery path or ARM resource ID
    pub image_id: String,
}

/// Remote clients the provider resolves against
#[derive(Clone)]
pub struct GalleryClients {
    pub community: Arc<dyn CommunityGalleryImageVersionsApi>,
    pub node_image_versions: Arc<dyn NodeImageVersionsApi>,
    /// Builds clients for custom images in arbitrary subscriptions
    pub gallery_factory: Arc<dyn GalleryClientFactory>,
}

impl fmt::Debug for GalleryClients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GalleryClients").finish_non_exhaustive()
    }
}

/// Resolves node images with cached remote lookups
pub struct Provider {
    options: Options,
    community: CommunityResolver,
    shared: SharedResolver,
    custom: CustomResolver,
    server_version: Arc<dyn ServerVersionApi>,
    image_cache: ExpiringCache<String, String>,
    kubernetes_version_cache: ExpiringCache<&'static str, String>,
    changes: ChangeMonitor,
    in_flight: KeyedLocks,
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("options", &self.options)
            .field("image_cache", &self.image_cache)
            .field("kubernetes_version_cache", &self.kubernetes_version_cache)
            .finish_non_exhaustive()
    }
}

impl Provider {
    /// Create a provider with its own caches.
    ///
    /// Cache sweepers are spawned on the current Tokio runtime when there is one.
    pub fn new(options: Options, clients: GalleryClients, server_version: Arc<dyn ServerVersionApi>) -> Self {
        let community = CommunityResolver::new(clients.community, options.location.clone());
        let shared = SharedResolver::new(
            clients.node_image_versions,
            options.location.clone(),
            options.subscription_id.clone(),
            options.sig_subscription_id.clone(),
        );
        let custom = CustomResolver::new(clients.gallery_factory);
        let image_cache = ExpiringCache::new(options.image_cache_ttl, options.image_cache_cleanup_interval);
        let kubernetes_version_cache = ExpiringCache::new(
            options.kubernetes_version_cache_ttl,
            options.image_cache_cleanup_interval,
        );
        Self {
            options,
            community,
            shared,
            custom,
            server_version,
            image_cache,
            kubernetes_version_cache,
            changes: ChangeMonitor::new(),
            in_flight: KeyedLocks::default(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Distro and image reference for `instance_type` under `node_class`.
    ///
    /// A custom image term takes precedence over the family's default catalog.
    pub async fn get(
        &self,
        node_class: &AKSNodeClassSpec,
        instance_type: &InstanceType,
        family: &dyn ImageFamily,
    ) -> Result<ResolvedImage, ImageError> {
        match node_class.image_source() {
            ImageSource::Custom(term) => {
                let image_id = self.get_custom_image_id(term).await?;
                Ok(ResolvedImage {
                    distro: term.distro_name.to_string(),
                    image_id,
                })
            }
            ImageSource::Default => {
                let catalog = family.default_images();
                let image = matcher::select(&catalog, instance_type)?;
                let image_id = self.get_latest_image_id(image).await?;
                Ok(ResolvedImage {
                    distro: image.distro.to_string(),
                    image_id,
                })
            }
        }
    }

    /// Every image a node class can currently use: one per default catalog entry, or its custom image
    pub async fn resolve_all(
        &self,
        node_class: &AKSNodeClassSpec,
        family: &dyn ImageFamily,
    ) -> Result<Vec<ResolvedImage>, ImageError> {
        match node_class.image_source() {
            ImageSource::Custom(term) => Ok(vec![ResolvedImage {
                distro: term.distro_name.to_string(),
                image_id: self.get_custom_image_id(term).await?,
            }]),
            ImageSource::Default => {
                let mut images = Vec::new();
                for image in family.default_images() {
                    images.push(ResolvedImage {
                        image_id: self.get_latest_image_id(&image).await?,
                        distro: image.distro.to_string(),
                    });
                }
                Ok(images)
            }
        }
    }

    /// Newest image reference for a default catalog entry, from the shared or community gallery
    pub async fn get_latest_image_id(&self, image: &DefaultImageDescriptor) -> Result<String, ImageError> {
        if self.options.use_sig {
            let key = format!("{}/{}", image.gallery_name, image.image_definition);
            self.cached(key, || self.shared.resolve(image)).await
        } else {
            let key = format!("{}/{}", image.public_gallery_url, image.image_definition);
            self.cached(key, || self.community.resolve(&image.public_gallery_url, &image.image_definition))
                .await
        }
    }

    /// Resource ID for a custom image term, pinned or latest
    pub async fn get_custom_image_id(&self, term: &CustomImageTerm) -> Result<String, ImageError> {
        self.cached(custom_image_key(term), || self.custom.resolve(term)).await
    }

    /// Control plane version without the leading `v`
    pub async fn kube_server_version(&self) -> Result<String, ImageError> {
        if let Some(version) = self.kubernetes_version_cache.get(KUBERNETES_VERSION_CACHE_KEY) {
            return Ok(version);
        }
        let git_version = self.server_version.server_git_version().await?;
        let version = normalize_version(&git_version).to_string();
        self.kubernetes_version_cache
            .insert(KUBERNETES_VERSION_CACHE_KEY, version.clone());
        if self.changes.has_changed(KUBERNETES_VERSION_CHANGE_KEY, &version) {
            debug!(kubernetes_version = %version, "discovered kubernetes version");
        }
        Ok(version)
    }

    async fn cached<F, Fut>(&self, key: String, resolve: F) -> Result<String, ImageError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, ImageError>>,
    {
        if let Some(image_id) = self.image_cache.get(&key) {
            return Ok(image_id);
        }

        let lock = self.in_flight.lock_for(&key);
        let _guard = lock.lock().await;
        // Another caller may have resolved the key while we waited
        if let Some(image_id) = self.image_cache.get(&key) {
            return Ok(image_id);
        }

        let image_id = resolve().await?;
        if self.changes.has_changed(&key, &image_id) {
            info!(image_id = %image_id, key = %key, "discovered new image id");
        }
        self.image_cache.insert(key, image_id.clone());
        Ok(image_id)
    }
}
