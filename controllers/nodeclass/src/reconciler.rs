//! Reconciliation logic for AKSNodeClass.
//!
//! Resolves every image a node class can use, together with the control plane
//! version, and publishes them in the node class status. The status is only
//! patched when its content changes.

use crate::backoff::BackoffTracker;
use crate::error::ControllerError;
use chrono::{DateTime, Utc};
use crds::{AKSNodeClass, AKSNodeClassStatus, NodeImage, ResolutionState};
use imagefamily::{family, Provider, ResolvedImage};
use kube::api::{Patch, PatchParams};
use kube::Api;
use kube_runtime::controller::Action;
use std::time::Duration;
use tracing::{debug, error, info};

const BACKOFF_MIN: Duration = Duration::from_secs(60);
const BACKOFF_MAX: Duration = Duration::from_secs(10 * 60);

/// Reconciles AKSNodeClass resources.
pub struct Reconciler {
    provider: Provider,
    api: Api<AKSNodeClass>,
    refresh_interval: Duration,
    backoff: BackoffTracker,
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(provider: Provider, api: Api<AKSNodeClass>, refresh_interval: Duration) -> Self {
        Self {
            provider,
            api,
            refresh_interval,
            backoff: BackoffTracker::new(BACKOFF_MIN, BACKOFF_MAX),
        }
    }

    /// Reconciles an AKSNodeClass resource.
    ///
    /// On success the node class is requeued after the refresh interval so
    /// newly published images are picked up. On failure the status records
    /// the error and the previously resolved images are kept.
    pub async fn reconcile_node_class(&self, node_class: &AKSNodeClass) -> Result<Action, ControllerError> {
        let name = node_class
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| ControllerError::InvalidConfig("AKSNodeClass missing name".to_string()))?;

        debug!("Reconciling AKSNodeClass {}", name);

        match self.resolve(node_class).await {
            Ok((images, kubernetes_version)) => {
                self.backoff.succeeded(name);
                if let Some(status) = ready_status(node_class.status.as_ref(), images, kubernetes_version, Utc::now()) {
                    info!(
                        "AKSNodeClass {} resolved {} image(s) for kubernetes {}",
                        name,
                        status.images.len(),
                        status.kubernetes_version.as_deref().unwrap_or_default()
                    );
                    self.patch_status(name, &status).await?;
                }
                Ok(Action::requeue(self.refresh_interval))
            }
            Err(e) => {
                error!("Failed to resolve images for AKSNodeClass {}: {}", name, e);
                if let Some(status) = failed_status(node_class.status.as_ref(), &e.to_string(), Utc::now()) {
                    if let Err(patch_err) = self.patch_status(name, &status).await {
                        error!("Failed to update AKSNodeClass {} error status: {}", name, patch_err);
                    }
                }
                Err(e)
            }
        }
    }

    /// Delay before retrying a node class that failed to reconcile
    pub fn error_backoff(&self, node_class: &AKSNodeClass) -> Duration {
        self.backoff.failed(node_class.metadata.name.as_deref().unwrap_or_default())
    }

    async fn resolve(&self, node_class: &AKSNodeClass) -> Result<(Vec<ResolvedImage>, String), ControllerError> {
        let family = family::for_name(node_class.spec.image_family);
        let images = self.provider.resolve_all(&node_class.spec, family.as_ref()).await?;
        let kubernetes_version = self.provider.kube_server_version().await?;
        Ok((images, kubernetes_version))
    }

    async fn patch_status(&self, name: &str, status: &AKSNodeClassStatus) -> Result<(), ControllerError> {
        debug!("Patching AKSNodeClass {} status to {}", name, status.state.as_str());
        let mut status_patch = serde_json::json!({ "status": status });
        // A merge patch only removes fields that are explicitly null
        if status.error.is_none() {
            status_patch["status"]["error"] = serde_json::Value::Null;
        }
        self.api
            .patch_status(name, &PatchParams::default(), &Patch::Merge(&status_patch))
            .await?;
        Ok(())
    }
}

/// Status after a successful resolution, or `None` when the current status already says so
pub fn ready_status(
    current: Option<&AKSNodeClassStatus>,
    images: Vec<ResolvedImage>,
    kubernetes_version: String,
    now: DateTime<Utc>,
) -> Option<AKSNodeClassStatus> {
    let images: Vec<NodeImage> = images
        .into_iter()
        .map(|image| NodeImage {
            id: image.image_id,
            distro: image.distro,
        })
        .collect();

    if let Some(current) = current {
        if current.state == ResolutionState::Ready
            && current.error.is_none()
            && current.images == images
            && current.kubernetes_version.as_deref() == Some(kubernetes_version.as_str())
        {
            return None;
        }
    }

    Some(AKSNodeClassStatus {
        images,
        kubernetes_version: Some(kubernetes_version),
        state: ResolutionState::Ready,
        error: None,
        last_reconciled: Some(now),
    })
}

/// Status after a failed resolution, keeping previously resolved images; `None` when unchanged
pub fn failed_status(
    current: Option<&AKSNodeClassStatus>,
    error: &str,
    now: DateTime<Utc>,
) -> Option<AKSNodeClassStatus> {
    let previous = current.cloned().unwrap_or_default();
    if previous.state == ResolutionState::Failed && previous.error.as_deref() == Some(error) {
        return None;
    }
    Some(AKSNodeClassStatus {
        state: ResolutionState::Failed,
        error: Some(error.to_string()),
        last_reconciled: Some(now),
        ..previous
    })
}
