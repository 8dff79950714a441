//! Control plane version discovery.

use crate::error::ImageError;

/// Source of the API server's reported version
#[async_trait::async_trait]
pub trait ServerVersionApi: Send + Sync {
    /// Git version string as reported by the server, e.g. "v1.29.2"
    async fn server_git_version(&self) -> Result<String, ImageError>;
}

#[async_trait::async_trait]
impl ServerVersionApi for kube::Client {
    async fn server_git_version(&self) -> Result<String, ImageError> {
        Ok(self.apiserver_version().await?.git_version)
    }
}

/// Strip the leading `v`: "v1.29.2" becomes "1.29.2"
pub fn normalize_version(git_version: &str) -> &str {
    git_version.strip_prefix('v').unwrap_or(git_version)
}
