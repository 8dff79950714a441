//! Common utilities for the ARM client
//!
//! Provides the paged response shape and the authenticated HTTP wrapper
//! shared by every API surface.

use crate::credential::{TokenCredential, ARM_SCOPE};
use crate::error::GalleryError;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Default Azure Resource Manager endpoint
pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";

/// One page of an ARM list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    /// Absolute URL of the next page, absent on the last page
    #[serde(rename = "nextLink", default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

impl<T> Page<T> {
    /// A final page holding `value`
    pub fn last(value: Vec<T>) -> Self {
        Self { value, next_link: None }
    }
}

/// HTTP client wrapper that attaches an ARM bearer token to every request
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    endpoint: String,
    credential: Arc<dyn TokenCredential>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, endpoint: String, credential: Arc<dyn TokenCredential>) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credential,
        }
    }

    /// Get the ARM endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build a full URL from a path.
    ///
    /// Absolute URLs (next links) are only followed when they share the
    /// endpoint's origin, since the bearer token is attached to them.
    pub fn build_url(&self, path: &str) -> Result<String, GalleryError> {
        if !path.contains("://") {
            return Ok(format!("{}{}", self.endpoint, path));
        }
        let link = Url::parse(path)
            .map_err(|e| GalleryError::InvalidRequest(format!("invalid link {:?}: {}", path, e)))?;
        let endpoint = Url::parse(&self.endpoint)
            .map_err(|e| GalleryError::InvalidRequest(format!("invalid endpoint {:?}: {}", self.endpoint, e)))?;
        if link.origin() != endpoint.origin() {
            return Err(GalleryError::InvalidRequest(format!(
                "refusing to follow link {} outside {}",
                path, self.endpoint
            )));
        }
        Ok(link.into())
    }

    /// GET a JSON document
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, GalleryError> {
        let url = self.build_url(path)?;
        debug!("GET {}", url);

        let token = self.credential.get_token(ARM_SCOPE).await?;
        let response = self
            .client
            .get(&url)
            .bearer_auth(&token.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match status {
            StatusCode::NOT_FOUND => return Err(GalleryError::NotFound(url)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(GalleryError::Authentication(format!("{} - {}", status, body)));
            }
            s if !s.is_success() => {
                return Err(GalleryError::Api {
                    status: s.as_u16(),
                    message: body,
                });
            }
            _ => {}
        }

        serde_json::from_str(&body).map_err(|e| GalleryError::Api {
            status: status.as_u16(),
            message: format!(
                "error decoding response body: {} - Response (first 500 chars): {}",
                e,
                body.chars().take(500).collect::<String>()
            ),
        })
    }

    /// GET one page of a list; `next_link` continues a previous listing
    pub async fn get_page<T: for<'de> Deserialize<'de>>(
        &self,
        first_page: &str,
        next_link: Option<&str>,
    ) -> Result<Page<T>, GalleryError> {
        match next_link {
            Some(link) => self.get(link).await,
            None => self.get(first_page).await,
        }
    }
}

/// Percent-encode one ARM path segment, rejecting empty values
pub(crate) fn segment<'a>(name: &str, value: &'a str) -> Result<std::borrow::Cow<'a, str>, GalleryError> {
    if value.is_empty() {
        return Err(GalleryError::InvalidRequest(format!("{} must not be empty", name)));
    }
    Ok(urlencoding::encode(value))
}
