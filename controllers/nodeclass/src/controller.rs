//! Main controller implementation.
//!
//! Wires the Kubernetes client, the ARM gallery clients and the image
//! provider together, then runs the AKSNodeClass watcher.

use crate::config::Config;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::watcher::watch_node_classes;
use crds::AKSNodeClass;
use gallery_client::{default_credential_from_env, ArmClient, ArmClientFactory};
use imagefamily::{GalleryClients, Provider};
use kube::{Api, Client};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for AKSNodeClass image resolution.
#[derive(Debug)]
pub struct Controller {
    node_class_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts watching.
    pub async fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Initializing AKSNodeClass Controller");

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        // Create ARM clients sharing one HTTP client and credential
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(gallery_client::GalleryError::from)?;
        let credential = default_credential_from_env(http.clone())?;
        let arm = Arc::new(ArmClient::with_http_client(
            http.clone(),
            config.arm_endpoint.clone(),
            config.options.subscription_id.clone(),
            Arc::clone(&credential),
        )?);
        let clients = GalleryClients {
            community: arm.clone(),
            node_image_versions: arm,
            gallery_factory: Arc::new(ArmClientFactory::new(http, config.arm_endpoint.clone(), credential)),
        };

        let provider = Provider::new(config.options.clone(), clients, Arc::new(kube_client.clone()));

        // AKSNodeClass is cluster-scoped
        let node_class_api: Api<AKSNodeClass> = Api::all(kube_client);
        let reconciler = Arc::new(Reconciler::new(
            provider,
            node_class_api.clone(),
            config.refresh_interval,
        ));

        let label_selector = config.label_selector.clone();
        let node_class_watcher = tokio::spawn(async move {
            watch_node_classes(node_class_api, reconciler, label_selector).await
        });

        Ok(Self { node_class_watcher })
    }

    /// Runs the controller until the watcher exits.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("AKSNodeClass Controller running");

        self.node_class_watcher
            .await
            .map_err(|e| ControllerError::Watch(format!("AKSNodeClass watcher panicked: {}", e)))?
    }
}
