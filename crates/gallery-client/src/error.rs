//! Gallery client errors

use thiserror::Error;

/// Errors that can occur when talking to the Azure Resource Manager APIs
#[derive(Debug, Error)]
pub enum GalleryError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// ARM returned a non-success status
    #[error("ARM API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by ARM
        status: u16,
        /// Response body or error description
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Request was rejected as unauthenticated or forbidden
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// No credential could be obtained
    #[error("Credential unavailable: {0}")]
    Credential(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request (e.g., empty subscription or path segment)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GalleryError {
    /// Returns true if the error is a 404 from ARM
    pub fn is_not_found(&self) -> bool {
        matches!(self, GalleryError::NotFound(_))
    }
}
