//! AKSNodeClass watcher.
//!
//! Drives reconciliation with `kube_runtime::Controller`, which handles
//! reconnection, requeues and per-object serialization.

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crds::AKSNodeClass;
use futures::StreamExt;
use kube::Api;
use kube_runtime::controller::{Action, Config as ControllerConfig};
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

async fn reconcile(node_class: Arc<AKSNodeClass>, reconciler: Arc<Reconciler>) -> Result<Action, ControllerError> {
    reconciler.reconcile_node_class(&node_class).await
}

fn error_policy(node_class: Arc<AKSNodeClass>, error: &ControllerError, reconciler: Arc<Reconciler>) -> Action {
    let delay = reconciler.error_backoff(&node_class);
    warn!(
        "Reconciliation error for AKSNodeClass {}: {} (retrying in {}s)",
        node_class.metadata.name.as_deref().unwrap_or("<unknown>"),
        error,
        delay.as_secs()
    );
    Action::requeue(delay)
}

/// Watch AKSNodeClass resources until the stream ends.
pub async fn watch_node_classes(
    api: Api<AKSNodeClass>,
    reconciler: Arc<Reconciler>,
    label_selector: Option<String>,
) -> Result<(), ControllerError> {
    info!("Starting AKSNodeClass watcher");

    let mut watcher_config = watcher::Config::default();
    if let Some(selector) = label_selector.as_deref() {
        watcher_config = watcher_config.labels(selector);
    }

    // Debounce batches bursts of events, including our own status patches
    let controller_config = ControllerConfig::default()
        .debounce(Duration::from_secs(5))
        .concurrency(4);

    Controller::new(api, watcher_config)
        .with_config(controller_config)
        .run(reconcile, error_policy, reconciler)
        .for_each(|res| async move {
            match res {
                Ok((object, _)) => debug!("Reconciled AKSNodeClass {}", object.name),
                Err(e) => error!("AKSNodeClass controller error: {}", e),
            }
        })
        .await;

    Ok(())
}
