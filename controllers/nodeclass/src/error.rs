//! Controller-specific error types.

use gallery_client::GalleryError;
use imagefamily::ImageError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the AKSNodeClass controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Gallery client setup error
    #[error("Gallery client error: {0}")]
    Gallery(#[from] GalleryError),

    /// Image resolution failed
    #[error("Image resolution failed: {0}")]
    Image(#[from] ImageError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
