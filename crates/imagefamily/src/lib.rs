//! Node image resolution for `AKSNodeClass`
//!
//! Decides which VM image a new worker node boots from. Default images come
//! from an image family's catalog and are resolved against either the public
//! community gallery or the AKS shared image gallery; node classes with a
//! custom image term resolve against the user's own gallery instead.
//!
//! Resolved references are cached for a bounded time so provisioning
//! decisions do not hit ARM on every call.
//!
//! # Example
//!
//! ```no_run
//! use gallery_client::{default_credential_from_env, ArmClient, ArmClientFactory};
//! use imagefamily::{family, GalleryClients, InstanceType, Options, Provider};
//! use std::sync::Arc;
//!
//! # async fn example(node_class: crds::AKSNodeClass, instance_type: InstanceType) -> Result<(), Box<dyn std::error::Error>> {
//! let http = reqwest::Client::new();
//! let credential = default_credential_from_env(http.clone())?;
//! let arm = Arc::new(ArmClient::new(
//!     gallery_client::DEFAULT_ARM_ENDPOINT.to_string(),
//!     "00000000-0000-0000-0000-000000000000".to_string(),
//!     Arc::clone(&credential),
//! )?);
//! let clients = GalleryClients {
//!     community: arm.clone(),
//!     node_image_versions: arm,
//!     gallery_factory: Arc::new(ArmClientFactory::public_cloud(http, credential)),
//! };
//! let kube = kube::Client::try_default().await?;
//! let provider = Provider::new(
//!     Options::new("eastus", "00000000-0000-0000-0000-000000000000"),
//!     clients,
//!     Arc::new(kube),
//! );
//!
//! let family = family::for_name(node_class.spec.image_family);
//! let image = provider.get(&node_class.spec, &instance_type, family.as_ref()).await?;
//! println!("{} {}", image.distro, image.image_id);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod change_monitor;
pub mod error;
pub mod family;
pub mod instance_type;
pub mod kube_version;
pub mod labels;
pub mod matcher;
pub mod options;
pub mod provider;
pub mod requirements;
pub mod resolver;
mod single_flight;

pub use cache::ExpiringCache;
pub use change_monitor::ChangeMonitor;
pub use error::ImageError;
pub use family::{DefaultImageDescriptor, ImageFamily};
pub use instance_type::InstanceType;
pub use kube_version::ServerVersionApi;
pub use options::{
    Options, DEFAULT_IMAGE_CACHE_CLEANUP_INTERVAL, DEFAULT_IMAGE_CACHE_TTL, DEFAULT_KUBERNETES_VERSION_CACHE_TTL,
};
pub use provider::{GalleryClients, Provider, ResolvedImage};
pub use requirements::{AllowUndefined, Operator, Requirement, Requirements};
