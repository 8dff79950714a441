//! Default image selection.

use crate::error::ImageError;
use crate::family::DefaultImageDescriptor;
use crate::instance_type::InstanceType;
use crate::requirements::AllowUndefined;
use tracing::trace;

/// First catalog entry, in declared order, that the instance type can boot.
///
/// Well-known and restricted labels the instance type leaves undefined do not
/// disqualify an entry.
pub fn select<'a>(
    catalog: &'a [DefaultImageDescriptor],
    instance_type: &InstanceType,
) -> Result<&'a DefaultImageDescriptor, ImageError> {
    catalog
        .iter()
        .find(|image| {
            match instance_type
                .requirements
                .compatible(&image.requirements, AllowUndefined::WellKnownAndRestrictedLabels)
            {
                Ok(()) => true,
                Err(err) => {
                    trace!(
                        instance_type = %instance_type.name,
                        image = %image.image_definition,
                        "skipping image: {}",
                        err
                    );
                    false
                }
            }
        })
        .ok_or_else(|| ImageError::NoCompatibleImage {
            instance_type: instance_type.name.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::{ImageFamily, Ubuntu2204};
    use crate::labels::*;
    use crate::requirements::{Operator, Requirement, Requirements};

    fn instance(name: &str, arch: &str, generations: &[&str]) -> InstanceType {
        InstanceType::new(
            name,
            Requirements::new()
                .with(Requirement::new(LABEL_ARCH, Operator::In, [arch]))
                .with(Requirement::new(
                    LABEL_SKU_HYPERV_GENERATION,
                    Operator::In,
                    generations.iter().copied(),
                )),
        )
    }

    #[test]
    fn test_prefers_first_compatible_entry() {
        let catalog = Ubuntu2204.default_images();
        let both = instance("Standard_D2s_v5", ARCH_AMD64, &[HYPERV_GENERATION_V1, HYPERV_GENERATION_V2]);
        let selected = select(&catalog, &both).unwrap();
        assert_eq!(selected.image_definition, "2204gen2containerd");
    }

    #[test]
    fn test_falls_through_to_later_entries() {
        let catalog = Ubuntu2204.default_images();
        let gen1 = instance("Standard_A2_v2", ARCH_AMD64, &[HYPERV_GENERATION_V1]);
        assert_eq!(select(&catalog, &gen1).unwrap().image_definition, "2204containerd");

        let arm = instance("Standard_D2ps_v5", ARCH_ARM64, &[HYPERV_GENERATION_V2]);
        assert_eq!(select(&catalog, &arm).unwrap().image_definition, "2204gen2arm64containerd");
    }

    #[test]
    fn test_instance_without_generation_label_matches_first() {
        let catalog = Ubuntu2204.default_images();
        let bare = InstanceType::new(
            "Standard_B2s",
            Requirements::new().with(Requirement::new(LABEL_ARCH, Operator::In, [ARCH_AMD64])),
        );
        assert_eq!(select(&catalog, &bare).unwrap().image_definition, "2204gen2containerd");
    }

    #[test]
    fn test_no_match_names_instance_type() {
        let catalog = Ubuntu2204.default_images();
        let s390x = instance("Standard_Z1", "s390x", &[HYPERV_GENERATION_V2]);
        let err = select(&catalog, &s390x).unwrap_err();
        assert_eq!(err.to_string(), "no compatible images found for instance type Standard_Z1");
    }

    #[test]
    fn test_empty_catalog() {
        let any = instance("Standard_D2s_v5", ARCH_AMD64, &[HYPERV_GENERATION_V2]);
        assert!(matches!(select(&[], &any), Err(ImageError::NoCompatibleImage { .. })));
    }
}
