//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the Kubernetes
//! client, the cluster gateway, the reconciler and the MyAppResource watcher
//! together.

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::watcher::Watcher;
use cluster_gateway::KubeGateway;
use crds::MyAppResource;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for MyAppResource management.
#[derive(Debug)]
pub struct Controller {
    watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(namespace: Option<String>) -> Result<Self, ControllerError> {
        info!("Initializing MyApp Controller");

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        // Create API handle and gateway over the same injected client
        let ns = namespace.as_deref().unwrap_or("default");
        let api: Api<MyAppResource> = Api::namespaced(kube_client.clone(), ns);
        let gateway = KubeGateway::new(kube_client);

        // Create reconciler and watcher
        let reconciler = Arc::new(Reconciler::new(Arc::new(gateway)));
        let watcher_instance = Watcher::new(reconciler, api);

        // Start the watcher in a background task
        let watcher = tokio::spawn(async move { watcher_instance.watch().await });

        Ok(Self { watcher })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("MyApp Controller running");

        self.watcher
            .await
            .map_err(|e| ControllerError::Watch(format!("MyAppResource watcher panicked: {e}")))??;

        Ok(())
    }
}
