//! ClusterGateway trait for mocking
//!
//! This trait abstracts the cluster API wrappers so reconcilers can be unit
//! tested against an in-memory double. The concrete [`crate::KubeGateway`]
//! implements it; tests use the `MockClusterGateway` behind the `test-util`
//! feature.

use crate::error::GatewayError;
use crate::outcome::{Applied, Teardown};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;

/// Trait for the operator's cluster API operations.
///
/// All methods are namespace-scoped and idempotent: upserts fall back to a
/// patch on conflict, teardowns treat absence as success. All async methods
/// must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ClusterGateway: Send + Sync {
    /// Create the Deployment, or patch it by name if it already exists.
    async fn create_or_update_deployment(
        &self,
        namespace: &str,
        name: &str,
        desired: Deployment,
    ) -> Result<Applied<Deployment>, GatewayError>;

    /// Create the Service, or patch it by name if it already exists.
    async fn create_or_update_service(
        &self,
        namespace: &str,
        name: &str,
        desired: Service,
    ) -> Result<Applied<Service>, GatewayError>;

    /// Delete the Deployment; an already-absent Deployment is success.
    async fn teardown_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Teardown, GatewayError>;

    /// Delete the Service; an already-absent Service is success.
    async fn teardown_service(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Teardown, GatewayError>;

    /// Look up a Deployment by name, returning `None` when absent.
    async fn get_deployment_by_name(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Deployment>, GatewayError>;
}
