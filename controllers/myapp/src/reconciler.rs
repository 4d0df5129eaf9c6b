//! Reconciliation logic for MyAppResource.
//!
//! Decides which child Deployment+Service pairs are needed for a parent
//! resource, builds and adopts them, applies them through the cluster
//! gateway, and assembles the per-child status the framework glue persists.
//!
//! Create always applies podinfo and applies redis only when enabled.
//! Update interprets a field-level spec diff: redis entries toggle the redis
//! pair, anything else re-applies podinfo (but never creates it from the
//! update path). No retries and no rollback here; unexpected gateway errors
//! propagate so the watch loop can fail the attempt.

use crate::diff::DiffEntry;
use crate::error::ControllerError;
use crate::resources;
use cluster_gateway::ClusterGateway;
use crds::{ChildStatus, Children, CreateResult, MyAppResource};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{EnvVar, ResourceRequirements, ServicePort};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use std::sync::Arc;
use tracing::{debug, info};

/// Reconciles MyAppResource parents into podinfo/redis child workloads.
pub struct Reconciler {
    gateway: Arc<dyn ClusterGateway>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a reconciler over an injected cluster gateway.
    pub fn new(gateway: Arc<dyn ClusterGateway>) -> Self {
        Self { gateway }
    }

    /// Handles initial creation of a parent resource.
    ///
    /// Podinfo is always applied; redis only when `spec.redis.enabled` is
    /// true, otherwise its status stays at the default uncreated value.
    pub async fn handle_create(
        &self,
        parent: &MyAppResource,
    ) -> Result<CreateResult, ControllerError> {
        let namespace = namespace_of(parent)?;
        let name = parent.metadata.name.as_deref().unwrap_or("<unknown>");
        info!("Creating children for MyAppResource {}/{}", namespace, name);

        let pod_info = self.apply_podinfo(parent, &namespace).await?;

        let redis = if redis_enabled(parent) {
            self.apply_redis(parent, &namespace).await?
        } else {
            debug!("redis disabled for {}/{}, leaving default status", namespace, name);
            ChildStatus::default()
        };

        Ok(CreateResult {
            children: Children { redis, pod_info },
        })
    }

    /// Handles an update to a parent resource, driven by the spec diff.
    ///
    /// Starts from the children recorded under `status.on_create` and merges
    /// in whatever this pass creates or re-applies. Each diff entry is
    /// evaluated independently:
    /// - exactly `spec.redis.enabled` flipping to true enables redis (only
    ///   if no redis Deployment exists yet);
    /// - any other redis-path change tears the redis pair down;
    /// - any non-redis change re-applies podinfo, provided its Deployment
    ///   already exists. Creation only happens on the create path.
    pub async fn handle_update(
        &self,
        parent: &MyAppResource,
        diff: &[DiffEntry],
    ) -> Result<Children, ControllerError> {
        let namespace = namespace_of(parent)?;
        let name = parent.metadata.name.as_deref().unwrap_or("<unknown>");

        let mut children = parent
            .status
            .as_ref()
            .and_then(|status| status.on_create.as_ref())
            .map(|created| created.children.clone())
            .unwrap_or_default();

        for entry in diff {
            if entry.spec_field() == Some(resources::REDIS_NAME) {
                // Only enabling and disabling redis is supported
                let enabling =
                    entry.path_is(&["spec", "redis", "enabled"]) && entry.new_is_true();
                if enabling {
                    // Enabled but not deployed yet: create it
                    let existing = self
                        .gateway
                        .get_deployment_by_name(&namespace, resources::REDIS_NAME)
                        .await?;
                    if existing.is_none() {
                        info!("Enabling redis for {}/{}", namespace, name);
                        children.redis = self.apply_redis(parent, &namespace).await?;
                    } else {
                        debug!("redis already deployed in {}, skipping create", namespace);
                    }
                } else {
                    info!("Disabling redis for {}/{}", namespace, name);
                    self.gateway
                        .teardown_deployment(&namespace, resources::REDIS_NAME)
                        .await?;
                    self.gateway
                        .teardown_service(&namespace, resources::REDIS_NAME)
                        .await?;
                }
            } else {
                // Podinfo change: re-apply only if the create path already
                // deployed it, otherwise ignore the change
                let existing = self
                    .gateway
                    .get_deployment_by_name(&namespace, resources::PODINFO_NAME)
                    .await?;
                if existing.is_some() {
                    info!("Re-applying podinfo for {}/{}", namespace, name);
                    children.pod_info = self.apply_podinfo(parent, &namespace).await?;
                } else {
                    debug!(
                        "podinfo not deployed in {}, ignoring update to {:?}",
                        namespace, entry.path
                    );
                }
            }
        }

        Ok(children)
    }

    /// Builds, adopts and applies the podinfo Deployment+Service pair.
    async fn apply_podinfo(
        &self,
        parent: &MyAppResource,
        namespace: &str,
    ) -> Result<ChildStatus, ControllerError> {
        let spec = &parent.spec;
        self.apply_pair(
            parent,
            namespace,
            resources::PODINFO_NAME,
            &spec.image.repository,
            &spec.image.tag,
            spec.replica_count,
            resources::podinfo_resources(spec),
            resources::PODINFO_PORT,
            Some(resources::podinfo_env(spec)),
        )
        .await
    }

    /// Builds, adopts and applies the redis Deployment+Service pair with its
    /// fixed image and resource profile.
    async fn apply_redis(
        &self,
        parent: &MyAppResource,
        namespace: &str,
    ) -> Result<ChildStatus, ControllerError> {
        self.apply_pair(
            parent,
            namespace,
            resources::REDIS_NAME,
            resources::REDIS_IMAGE_REPO,
            resources::REDIS_IMAGE_TAG,
            1,
            resources::redis_resources(),
            resources::REDIS_PORT,
            None,
        )
        .await
    }

    /// Shared build/adopt/create-or-update sequence for one child component.
    #[allow(clippy::too_many_arguments)]
    async fn apply_pair(
        &self,
        parent: &MyAppResource,
        namespace: &str,
        name: &str,
        image_repo: &str,
        image_tag: &str,
        replicas: i32,
        requirements: ResourceRequirements,
        expose_port: i32,
        env_vars: Option<Vec<EnvVar>>,
    ) -> Result<ChildStatus, ControllerError> {
        let mut deployment = resources::deployment_object(
            name,
            namespace,
            image_repo,
            image_tag,
            replicas,
            requirements,
            Some(expose_port),
            env_vars,
        );
        let mut service = resources::service_object(
            name,
            namespace,
            vec![ServicePort {
                name: Some(name.to_string()),
                protocol: Some("TCP".to_string()),
                port: expose_port,
                ..Default::default()
            }],
            resources::app_labels(name),
        );

        // Adopt before any cluster call so GC cascades from the parent
        adopt(&mut deployment.metadata, parent)?;
        adopt(&mut service.metadata, parent)?;

        let live = self
            .gateway
            .create_or_update_deployment(namespace, name, deployment)
            .await?
            .into_inner();
        self.gateway
            .create_or_update_service(namespace, name, service)
            .await?;

        child_status(&live)
    }
}

/// Whether the parent spec asks for the redis component.
fn redis_enabled(parent: &MyAppResource) -> bool {
    parent.spec.redis.as_ref().is_some_and(|redis| redis.enabled)
}

fn namespace_of(parent: &MyAppResource) -> Result<String, ControllerError> {
    parent
        .metadata
        .namespace
        .clone()
        .ok_or_else(|| ControllerError::MissingMetadata("MyAppResource missing namespace".to_string()))
}

/// Marks a child object as owned by the parent resource.
fn adopt(metadata: &mut ObjectMeta, parent: &MyAppResource) -> Result<(), ControllerError> {
    let owner = parent.controller_owner_ref(&()).ok_or_else(|| {
        ControllerError::MissingMetadata("MyAppResource missing name or uid".to_string())
    })?;
    metadata.owner_references.get_or_insert_with(Vec::new).push(owner);
    Ok(())
}

/// Child status recorded from the live Deployment's metadata.
fn child_status(live: &Deployment) -> Result<ChildStatus, ControllerError> {
    let created_on = live
        .metadata
        .creation_timestamp
        .as_ref()
        .map(|time| time.0.format("%c").to_string())
        .ok_or_else(|| {
            ControllerError::MissingMetadata("Deployment missing creationTimestamp".to_string())
        })?;
    let uid = live.metadata.uid.clone().ok_or_else(|| {
        ControllerError::MissingMetadata("Deployment missing uid".to_string())
    })?;
    Ok(ChildStatus { created_on, uid })
}
