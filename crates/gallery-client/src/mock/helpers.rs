//! Helper functions for building model records in tests

use crate::models::*;
use chrono::{DateTime, Utc};

/// Community gallery version with a publish date
pub fn community_version(name: &str, published: DateTime<Utc>) -> CommunityGalleryImageVersion {
    CommunityGalleryImageVersion {
        name: Some(name.to_string()),
        location: Some("eastus".to_string()),
        resource_type: Some("Microsoft.Compute/Locations/CommunityGalleryImageVersion".to_string()),
        properties: Some(CommunityGalleryImageVersionProperties {
            published_date: Some(published),
            end_of_life_date: None,
            exclude_from_latest: Some(false),
        }),
        identifier: None,
    }
}

/// Gallery image version with a full ARM ID built from its coordinates
pub fn gallery_version(
    subscription_id: &str,
    resource_group: &str,
    gallery_name: &str,
    image_name: &str,
    version: &str,
    published: DateTime<Utc>,
) -> GalleryImageVersion {
    GalleryImageVersion {
        id: Some(format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Compute/galleries/{}/images/{}/versions/{}",
            subscription_id, resource_group, gallery_name, image_name, version
        )),
        name: Some(version.to_string()),
        location: Some("eastus".to_string()),
        properties: Some(GalleryImageVersionProperties {
            publishing_profile: Some(PublishingProfile {
                published_date: Some(published),
                end_of_life_date: None,
                exclude_from_latest: Some(false),
            }),
            provisioning_state: Some("Succeeded".to_string()),
        }),
    }
}

/// Node image version record for a shared gallery SKU
pub fn node_image_version(sku: &str, version: &str) -> NodeImageVersion {
    NodeImageVersion {
        full_name: format!("AKSUbuntu-{}-{}", sku, version),
        os: "AKSUbuntu".to_string(),
        sku: sku.to_string(),
        version: version.to_string(),
    }
}
