//! Family for node classes that bring their own gallery image.

use super::{shape, DefaultImageDescriptor, ImageFamily};
use crate::labels::{ARCH_AMD64, HYPERV_GENERATION_V2};
use crds::{DistroName, ImageFamilyName};

/// Placeholder gallery coordinate; custom images are addressed by their term instead
pub const USER_DEFINED: &str = "UserDefined";

#[derive(Debug, Clone, Copy, Default)]
pub struct CustomImages;

impl ImageFamily for CustomImages {
    fn name(&self) -> ImageFamilyName {
        ImageFamilyName::Custom
    }

    /// A single amd64 gen2 entry; its distro is replaced by the term's `distroName`
    fn default_images(&self) -> Vec<DefaultImageDescriptor> {
        vec![DefaultImageDescriptor {
            public_gallery_url: USER_DEFINED.to_string(),
            image_definition: USER_DEFINED.to_string(),
            distro: DistroName::UbuntuContainerd2204Gen2,
            gallery_name: USER_DEFINED.to_string(),
            gallery_resource_group: USER_DEFINED.to_string(),
            requirements: shape(ARCH_AMD64, HYPERV_GENERATION_V2),
        }]
    }
}
