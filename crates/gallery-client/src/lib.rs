//! Azure compute gallery client
//!
//! A Rust client for the Azure Resource Manager endpoints used to resolve
//! node images: community gallery version listings, private gallery image
//! versions, and the AKS node image version list.
//!
//! # Example
//!
//! ```no_run
//! use gallery_client::{ArmClient, CommunityGalleryImageVersionsApi, StaticTokenCredential};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArmClient::new(
//!     "https://management.azure.com".to_string(),
//!     "00000000-0000-0000-0000-000000000000".to_string(),
//!     Arc::new(StaticTokenCredential::new("token")),
//! )?;
//!
//! let mut next = None;
//! loop {
//!     let page = client
//!         .list_community_image_versions(
//!             "eastus",
//!             "AKSUbuntu-38d80f77-467a-481f-a8d4-09b6d4220bd2",
//!             "2204gen2containerd",
//!             next.as_deref(),
//!         )
//!         .await?;
//!     for version in &page.value {
//!         println!("{:?} {:?}", version.name, version.published_date());
//!     }
//!     match page.next_link {
//!         Some(link) => next = Some(link),
//!         None => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod common;
pub mod credential;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod gallery_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::{ArmClient, ArmClientFactory};
pub use common::{HttpClient, Page, DEFAULT_ARM_ENDPOINT};
pub use credential::{
    default_credential_from_env, AccessToken, ClientCredential, StaticTokenCredential, TokenCredential, ARM_SCOPE,
};
pub use error::GalleryError;
pub use gallery_trait::*;
pub use models::*;
#[cfg(feature = "test-util")]
pub use mock::{MockGalleryClient, MockOperation};
