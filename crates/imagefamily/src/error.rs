//! Image resolution errors.

use gallery_client::GalleryError;
use thiserror::Error;

/// Errors returned by image resolution.
///
/// None of these are retried internally; the caller's control loop decides
/// whether to retry the whole resolution.
#[derive(Debug, Error)]
pub enum ImageError {
    /// No default catalog entry is compatible with the instance type
    #[error("no compatible images found for instance type {instance_type}")]
    NoCompatibleImage { instance_type: String },

    /// The shared gallery version list has no record for the SKU
    #[error("failed to get the latest version of the image {image_definition}")]
    NoMatchingVersion { image_definition: String },

    /// A custom gallery image has no published versions
    #[error("no versions found for gallery image {image}")]
    NoImageVersions { image: String },

    /// A gallery record came back without a resource ID
    #[error("gallery image version for {image} has no resource ID")]
    MissingImageId { image: String },

    /// Credential or client for the custom image's subscription could not be established
    #[error("failed to create gallery client for subscription {subscription_id}: {source}")]
    ClientConstruction {
        subscription_id: String,
        #[source]
        source: GalleryError,
    },

    /// Remote catalog lookup failed
    #[error(transparent)]
    Remote(#[from] GalleryError),

    /// Control plane version discovery failed
    #[error("failed to discover kubernetes version: {0}")]
    ServerVersion(String),
}

impl From<kube::Error> for ImageError {
    fn from(err: kube::Error) -> Self {
        ImageError::ServerVersion(err.to_string())
    }
}
