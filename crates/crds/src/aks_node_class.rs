//! AKSNodeClass CRD
//!
//! Describes how worker nodes for a pool are provisioned on Azure. The image
//! resolver only reads the image family and the optional custom image term;
//! the remaining fields are carried for the rest of the provisioning stack.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[kube(
    group = "karpenter.azure.com",
    version = "v1alpha2",
    kind = "AKSNodeClass",
    shortname = "aksnc",
    status = "AKSNodeClassStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct AKSNodeClassSpec {
    /// Subnet the node NICs are placed in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnet_subnet_id: Option<String>,

    /// OS disk size in GB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_disk_size_gb: Option<i32>,

    /// Image family the default images are picked from
    #[serde(default)]
    pub image_family: ImageFamilyName,

    /// User-supplied gallery image; when present the default catalog is bypassed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_image_term: Option<CustomImageTerm>,

    /// Tags applied to provisioned Azure resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

/// Where a node class gets its image from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// Newest image from the family's default catalog
    Default,
    /// A user-supplied gallery image
    Custom(&'a CustomImageTerm),
}

impl AKSNodeClassSpec {
    /// Image source, fixed by whether `customImageTerm` was present when the object was parsed
    pub fn image_source(&self) -> ImageSource<'_> {
        match &self.custom_image_term {
            Some(term) => ImageSource::Custom(term),
            None => ImageSource::Default,
        }
    }
}

/// Supported image families
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, Default)]
pub enum ImageFamilyName {
    #[default]
    Ubuntu2204,
    AzureLinux,
    Custom,
}

impl ImageFamilyName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFamilyName::Ubuntu2204 => "Ubuntu2204",
            ImageFamilyName::AzureLinux => "AzureLinux",
            ImageFamilyName::Custom => "Custom",
        }
    }
}

impl fmt::Display for ImageFamilyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointer to a specific image in an Azure compute gallery
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct CustomImageTerm {
    /// Subscription holding the gallery; may differ from the cluster's
    #[serde(rename = "gallerySubscriptionID")]
    pub gallery_subscription_id: String,

    pub gallery_resource_group_name: String,

    pub gallery_name: String,

    /// Image definition name
    pub name: String,

    /// Image version; empty or absent resolves the most recently published version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Distro the image is bootstrapped as
    #[serde(default)]
    pub distro_name: DistroName,
}

impl CustomImageTerm {
    /// The pinned version, if one was given
    pub fn pinned_version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.is_empty())
    }
}

/// Distros a node image can be bootstrapped as
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, Default)]
pub enum DistroName {
    #[default]
    #[serde(rename = "aks-ubuntu-containerd-22.04-gen2")]
    UbuntuContainerd2204Gen2,
    #[serde(rename = "aks-ubuntu-containerd-22.04")]
    UbuntuContainerd2204,
    #[serde(rename = "aks-ubuntu-arm64-containerd-22.04-gen2")]
    UbuntuArm64Containerd2204Gen2,
    #[serde(rename = "aks-azurelinux-v2-gen2")]
    AzureLinuxV2Gen2,
    #[serde(rename = "aks-azurelinux-v2")]
    AzureLinuxV2,
    #[serde(rename = "aks-azurelinux-v2-arm64-gen2")]
    AzureLinuxV2Arm64Gen2,
}

impl DistroName {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistroName::UbuntuContainerd2204Gen2 => "aks-ubuntu-containerd-22.04-gen2",
            DistroName::UbuntuContainerd2204 => "aks-ubuntu-containerd-22.04",
            DistroName::UbuntuArm64Containerd2204Gen2 => "aks-ubuntu-arm64-containerd-22.04-gen2",
            DistroName::AzureLinuxV2Gen2 => "aks-azurelinux-v2-gen2",
            DistroName::AzureLinuxV2 => "aks-azurelinux-v2",
            DistroName::AzureLinuxV2Arm64Gen2 => "aks-azurelinux-v2-arm64-gen2",
        }
    }
}

impl fmt::Display for DistroName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AKSNodeClassStatus {
    /// Images resolved for this node class
    #[serde(default)]
    pub images: Vec<NodeImage>,

    /// Control plane version the images were resolved against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,

    /// Resolution state
    #[serde(default)]
    pub state: ResolutionState,

    /// Error message if resolution failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Last time the image set changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<chrono::DateTime<chrono::Utc>>,
}

/// One resolved image
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeImage {
    /// Full image reference (community gallery path or ARM resource ID)
    pub id: String,
    pub distro: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
/// Image resolution state
pub enum ResolutionState {
    #[default]
    Pending,
    Ready,
    Failed,
}

impl ResolutionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionState::Pending => "Pending",
            ResolutionState::Ready => "Ready",
            ResolutionState::Failed => "Failed",
        }
    }
}
