//! ARM compute models
//!
//! These models follow the JSON shapes returned by the Microsoft.Compute
//! gallery APIs and the Microsoft.ContainerService node image version API.
//! Only the fields the image resolver reads are modelled; everything else is
//! ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published version of a community gallery image
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityGalleryImageVersion {
    /// Version name, e.g. "202401.09.0"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<CommunityGalleryImageVersionProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<CommunityGalleryIdentifier>,
}

impl CommunityGalleryImageVersion {
    /// Publish timestamp, if ARM reported one
    pub fn published_date(&self) -> Option<DateTime<Utc>> {
        self.properties.as_ref().and_then(|p| p.published_date)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityGalleryImageVersionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_of_life_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_from_latest: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityGalleryIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
}

/// A version of an image in a (private) compute gallery
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImageVersion {
    /// Full ARM resource ID of the version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<GalleryImageVersionProperties>,
}

impl GalleryImageVersion {
    /// Publish timestamp from the publishing profile, if present
    pub fn published_date(&self) -> Option<DateTime<Utc>> {
        self.properties
            .as_ref()
            .and_then(|p| p.publishing_profile.as_ref())
            .and_then(|p| p.published_date)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImageVersionProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishing_profile: Option<PublishingProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishingProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_of_life_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_from_latest: Option<bool>,
}

/// One entry of the AKS node image version list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeImageVersion {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub os: String,
    /// Image definition name inside the shared gallery, e.g. "2204gen2containerd"
    pub sku: String,
    /// Version string, e.g. "202405.20.0"
    pub version: String,
}

/// Response of the node image version list call (not paginated)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeImageVersionsResponse {
    #[serde(default)]
    pub values: Vec<NodeImageVersion>,
}
