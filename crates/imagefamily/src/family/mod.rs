//! # Image families
//!
//! An image family names an OS line (Ubuntu, Azure Linux, or user-supplied
//! images) and lists its default images in preference order. Each default
//! image carries the coordinates needed to find it in both the community
//! gallery and the AKS shared gallery, and the requirements an instance type
//! must be compatible with to boot it.

pub mod azure_linux;
pub mod custom;
pub mod ubuntu;

pub use azure_linux::AzureLinux;
pub use custom::CustomImages;
pub use ubuntu::Ubuntu2204;

use crate::labels::{LABEL_ARCH, LABEL_SKU_HYPERV_GENERATION};
use crate::requirements::{Operator, Requirement, Requirements};
use crds::{DistroName, ImageFamilyName};

/// A default image of a family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultImageDescriptor {
    /// Community gallery public name
    pub public_gallery_url: String,
    /// Community image name, also the shared gallery SKU
    pub image_definition: String,
    pub distro: DistroName,
    /// Shared gallery name
    pub gallery_name: String,
    pub gallery_resource_group: String,
    pub requirements: Requirements,
}

/// An OS line with an ordered catalog of default images
pub trait ImageFamily: Send + Sync {
    fn name(&self) -> ImageFamilyName;

    /// Default images, most preferred first
    fn default_images(&self) -> Vec<DefaultImageDescriptor>;
}

/// Requirements for an image built for `arch` on Hyper-V `generation`
pub(crate) fn shape(arch: &str, generation: &str) -> Requirements {
    [
        Requirement::new(LABEL_ARCH, Operator::In, [arch]),
        Requirement::new(LABEL_SKU_HYPERV_GENERATION, Operator::In, [generation]),
    ]
    .into_iter()
    .collect()
}

/// The family implementation for a node class's `imageFamily`
pub fn for_name(name: ImageFamilyName) -> Box<dyn ImageFamily> {
    match name {
        ImageFamilyName::Ubuntu2204 => Box::new(Ubuntu2204),
        ImageFamilyName::AzureLinux => Box::new(AzureLinux),
        ImageFamilyName::Custom => Box::new(CustomImages),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{ARCH_AMD64, HYPERV_GENERATION_V2};
    use crate::requirements::AllowUndefined;

    fn baseline() -> Requirements {
        shape(ARCH_AMD64, HYPERV_GENERATION_V2)
    }

    #[test]
    fn test_every_family_is_well_formed() {
        for name in [ImageFamilyName::Ubuntu2204, ImageFamilyName::AzureLinux, ImageFamilyName::Custom] {
            let family = for_name(name);
            assert_eq!(family.name(), name);
            let images = family.default_images();
            assert!(!images.is_empty(), "{} has no default images", name);
            assert!(
                images
                    .iter()
                    .any(|image| baseline().compatible(&image.requirements, AllowUndefined::None).is_ok()),
                "{} has no amd64 gen2 image",
                name
            );
        }
    }
}
