//! Azure Linux node images.

use super::{shape, DefaultImageDescriptor, ImageFamily};
use crate::labels::{ARCH_AMD64, ARCH_ARM64, HYPERV_GENERATION_V1, HYPERV_GENERATION_V2};
use crds::{DistroName, ImageFamilyName};

pub const AKS_AZURE_LINUX_PUBLIC_GALLERY_URL: &str = "AKSAzureLinux-f7c7cda5-1c9a-4bdc-a222-9614c968580b";
pub const AKS_AZURE_LINUX_GALLERY_NAME: &str = "AKSAzureLinux";
pub const AKS_AZURE_LINUX_RESOURCE_GROUP: &str = "AKS-AzureLinux";

pub const AZURE_LINUX_GEN2_IMAGE: &str = "V2gen2";
pub const AZURE_LINUX_GEN1_IMAGE: &str = "V2";
pub const AZURE_LINUX_GEN2_ARM64_IMAGE: &str = "V2gen2arm64";

#[derive(Debug, Clone, Copy, Default)]
pub struct AzureLinux;

impl ImageFamily for AzureLinux {
    fn name(&self) -> ImageFamilyName {
        ImageFamilyName::AzureLinux
    }

    fn default_images(&self) -> Vec<DefaultImageDescriptor> {
        [
            (AZURE_LINUX_GEN2_IMAGE, DistroName::AzureLinuxV2Gen2, ARCH_AMD64, HYPERV_GENERATION_V2),
            (AZURE_LINUX_GEN1_IMAGE, DistroName::AzureLinuxV2, ARCH_AMD64, HYPERV_GENERATION_V1),
            (AZURE_LINUX_GEN2_ARM64_IMAGE, DistroName::AzureLinuxV2Arm64Gen2, ARCH_ARM64, HYPERV_GENERATION_V2),
        ]
        .into_iter()
        .map(|(image, distro, arch, generation)| DefaultImageDescriptor {
            public_gallery_url: AKS_AZURE_LINUX_PUBLIC_GALLERY_URL.to_string(),
            image_definition: image.to_string(),
            distro,
            gallery_name: AKS_AZURE_LINUX_GALLERY_NAME.to_string(),
            gallery_resource_group: AKS_AZURE_LINUX_RESOURCE_GROUP.to_string(),
            requirements: shape(arch, generation),
        })
        .collect()
    }
}
