//! Kubernetes-backed gateway implementation.
//!
//! Wraps `kube::Api` handles for Deployments and Services with the
//! create-or-patch and idempotent-delete policies. The `kube::Client` is
//! injected at construction time; no global client state.

use crate::error::GatewayError;
use crate::gateway_trait::ClusterGateway;
use crate::outcome::{Applied, Teardown};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::Client;
use tracing::{debug, info};

/// Cluster gateway backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
}

impl std::fmt::Debug for KubeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeGateway").finish_non_exhaustive()
    }
}

impl KubeGateway {
    /// Creates a gateway over an injected Kubernetes client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn deployments(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn services(&self, namespace: &str) -> Api<Service> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Whether a kube error is an API error with the given HTTP status code.
fn is_api_status(err: &kube::Error, code: u16) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == code)
}

#[async_trait::async_trait]
impl ClusterGateway for KubeGateway {
    async fn create_or_update_deployment(
        &self,
        namespace: &str,
        name: &str,
        desired: Deployment,
    ) -> Result<Applied<Deployment>, GatewayError> {
        let api = self.deployments(namespace);
        match api.create(&PostParams::default(), &desired).await {
            Ok(created) => {
                info!("Created Deployment {}/{}", namespace, name);
                Ok(Applied::Created(created))
            }
            // Already exists: patch it by name with the same desired body
            Err(e) if is_api_status(&e, 409) => {
                debug!("Deployment {}/{} exists, patching", namespace, name);
                let patched = api
                    .patch(name, &PatchParams::default(), &Patch::Strategic(&desired))
                    .await?;
                info!("Patched Deployment {}/{}", namespace, name);
                Ok(Applied::Patched(patched))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_or_update_service(
        &self,
        namespace: &str,
        name: &str,
        desired: Service,
    ) -> Result<Applied<Service>, GatewayError> {
        let api = self.services(namespace);
        match api.create(&PostParams::default(), &desired).await {
            Ok(created) => {
                info!("Created Service {}/{}", namespace, name);
                Ok(Applied::Created(created))
            }
            Err(e) if is_api_status(&e, 409) => {
                debug!("Service {}/{} exists, patching", namespace, name);
                let patched = api
                    .patch(name, &PatchParams::default(), &Patch::Strategic(&desired))
                    .await?;
                info!("Patched Service {}/{}", namespace, name);
                Ok(Applied::Patched(patched))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn teardown_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Teardown, GatewayError> {
        match self
            .deployments(namespace)
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => {
                info!("Deleted Deployment {}/{}", namespace, name);
                Ok(Teardown::Deleted)
            }
            Err(e) if is_api_status(&e, 404) => {
                debug!("Deployment {}/{} already absent", namespace, name);
                Ok(Teardown::AlreadyAbsent)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn teardown_service(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Teardown, GatewayError> {
        match self
            .services(namespace)
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => {
                info!("Deleted Service {}/{}", namespace, name);
                Ok(Teardown::Deleted)
            }
            Err(e) if is_api_status(&e, 404) => {
                debug!("Service {}/{} already absent", namespace, name);
                Ok(Teardown::AlreadyAbsent)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_deployment_by_name(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Deployment>, GatewayError> {
        // Namespace deployment counts are small; a list plus linear scan is
        // cheaper than special-casing the get-by-name 404.
        let deployments = self
            .deployments(namespace)
            .list(&ListParams::default())
            .await?;
        Ok(deployments
            .items
            .into_iter()
            .find(|d| d.metadata.name.as_deref() == Some(name)))
    }
}
