//! AKSNodeClass Controller
//!
//! Resolves the node images each `AKSNodeClass` can use and keeps
//! `status.images` and `status.kubernetesVersion` current.
//!
//! Default images are looked up in the community gallery, or in the AKS
//! shared image gallery when `USE_SIG` is set. Node classes with a
//! `customImageTerm` resolve against the referenced gallery.

mod backoff;
mod config;
mod controller;
mod error;
mod reconciler;
mod watcher;

use anyhow::Context;
use config::Config;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // kube and reqwest both link rustls; pick one crypto provider for the process
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        info!("rustls crypto provider already installed");
    }

    info!("Starting AKSNodeClass Controller");

    let config = Config::from_env().context("failed to load configuration")?;

    info!("Configuration:");
    info!("  Location: {}", config.options.location);
    info!("  Subscription: {}", config.options.subscription_id);
    if config.options.use_sig {
        info!("  Image source: shared image gallery ({})", config.options.sig_subscription_id);
    } else {
        info!("  Image source: community gallery");
    }
    info!("  ARM endpoint: {}", config.arm_endpoint);
    info!("  Image cache TTL: {}s", config.options.image_cache_ttl.as_secs());
    info!("  Refresh interval: {}s", config.refresh_interval.as_secs());
    info!(
        "  Label selector: {}",
        config.label_selector.as_deref().unwrap_or("all node classes")
    );

    let controller = Controller::new(config)
        .await
        .context("failed to initialize controller")?;
    controller.run().await?;

    Ok(())
}
