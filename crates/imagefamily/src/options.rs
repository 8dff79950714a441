//! Resolver configuration.

use std::time::Duration;

/// How long a resolved image ID is reused before the catalog is consulted again
pub const DEFAULT_IMAGE_CACHE_TTL: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// How often expired image cache entries are swept
pub const DEFAULT_IMAGE_CACHE_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// How long the discovered control plane version is reused
pub const DEFAULT_KUBERNETES_VERSION_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Options for [`Provider`](crate::Provider).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Azure region the cluster runs in
    pub location: String,
    /// Cluster subscription, used for catalog listings
    pub subscription_id: String,
    /// Resolve default images from the shared image gallery instead of the community gallery
    pub use_sig: bool,
    /// Subscription that owns the shared image galleries
    pub sig_subscription_id: String,
    pub image_cache_ttl: Duration,
    pub image_cache_cleanup_interval: Duration,
    pub kubernetes_version_cache_ttl: Duration,
}

impl Options {
    /// Community gallery options with default cache timings
    pub fn new(location: impl Into<String>, subscription_id: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            subscription_id: subscription_id.into(),
            use_sig: false,
            sig_subscription_id: String::new(),
            image_cache_ttl: DEFAULT_IMAGE_CACHE_TTL,
            image_cache_cleanup_interval: DEFAULT_IMAGE_CACHE_CLEANUP_INTERVAL,
            kubernetes_version_cache_ttl: DEFAULT_KUBERNETES_VERSION_CACHE_TTL,
        }
    }

    /// Switch default image resolution to the shared image gallery
    #[must_use]
    pub fn with_sig(mut self, sig_subscription_id: impl Into<String>) -> Self {
        self.use_sig = true;
        self.sig_subscription_id = sig_subscription_id.into();
        self
    }
}
