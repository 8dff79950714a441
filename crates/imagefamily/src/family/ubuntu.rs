//! Ubuntu 22.04 node images.

use super::{shape, DefaultImageDescriptor, ImageFamily};
use crate::labels::{ARCH_AMD64, ARCH_ARM64, HYPERV_GENERATION_V1, HYPERV_GENERATION_V2};
use crds::{DistroName, ImageFamilyName};

pub const AKS_UBUNTU_PUBLIC_GALLERY_URL: &str = "AKSUbuntu-38d80f77-467a-481f-a8d4-09b6d4220bd2";
pub const AKS_UBUNTU_GALLERY_NAME: &str = "AKSUbuntu";
pub const AKS_UBUNTU_RESOURCE_GROUP: &str = "AKS-Ubuntu";

pub const UBUNTU_2204_GEN2_IMAGE: &str = "2204gen2containerd";
pub const UBUNTU_2204_GEN1_IMAGE: &str = "2204containerd";
pub const UBUNTU_2204_GEN2_ARM64_IMAGE: &str = "2204gen2arm64containerd";

#[derive(Debug, Clone, Copy, Default)]
pub struct Ubuntu2204;

impl ImageFamily for Ubuntu2204 {
    fn name(&self) -> ImageFamilyName {
        ImageFamilyName::Ubuntu2204
    }

    fn default_images(&self) -> Vec<DefaultImageDescriptor> {
        [
            (UBUNTU_2204_GEN2_IMAGE, DistroName::UbuntuContainerd2204Gen2, ARCH_AMD64, HYPERV_GENERATION_V2),
            (UBUNTU_2204_GEN1_IMAGE, DistroName::UbuntuContainerd2204, ARCH_AMD64, HYPERV_GENERATION_V1),
            (
                UBUNTU_2204_GEN2_ARM64_IMAGE,
                DistroName::UbuntuArm64Containerd2204Gen2,
                ARCH_ARM64,
                HYPERV_GENERATION_V2,
            ),
        ]
        .into_iter()
        .map(|(image, distro, arch, generation)| DefaultImageDescriptor {
            public_gallery_url: AKS_UBUNTU_PUBLIC_GALLERY_URL.to_string(),
            image_definition: image.to_string(),
            distro,
            gallery_name: AKS_UBUNTU_GALLERY_NAME.to_string(),
            gallery_resource_group: AKS_UBUNTU_RESOURCE_GROUP.to_string(),
            requirements: shape(arch, generation),
        })
        .collect()
    }
}
