//! MyApp Controller
//!
//! Operator for the MyAppResource CRD: reconciles each parent resource into
//! a podinfo Deployment+Service pair and, when enabled, a redis
//! Deployment+Service pair, all owned by the parent for cascade deletion.

mod controller;
mod diff;
mod error;
mod reconciler;
mod resources;
mod watcher;

#[cfg(test)]
mod test_utils;

use crate::error::ControllerError;
use controller::Controller;
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt::init();

    info!("Starting MyApp Controller");

    // Load configuration from environment variables
    let namespace = env::var("WATCH_NAMESPACE").ok();

    info!("Configuration:");
    info!("  Namespace: {}", namespace.as_deref().unwrap_or("default"));

    // Initialize and run controller
    let controller = Controller::new(namespace).await?;
    controller.run().await?;

    Ok(())
}
