//! Kubernetes resource watcher.
//!
//! Watches MyAppResource objects and routes each applied object to the
//! create or update path of the reconciler, then persists the returned
//! status under `status.on_create`. The last-handled spec is recorded in an
//! annotation so updates can be diffed field-by-field across restarts.
//!
//! Per-event reconcile failures are logged and the stream continues; the
//! next watch event is the retry path. Parent deletion needs no handling
//! here, owner references let the cluster GC collect the children.

use crate::diff::spec_diff;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crds::{MyAppResource, MyAppResourceSpec};
use futures::TryStreamExt;
use kube::api::{Api, Patch, PatchParams};
use kube_runtime::watcher;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Annotation holding the JSON spec of the last reconciled generation.
pub const LAST_HANDLED_ANNOTATION: &str = "my.api.group/last-handled-spec";

/// Watches MyAppResource objects for changes.
pub struct Watcher {
    reconciler: Arc<Reconciler>,
    api: Api<MyAppResource>,
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher").finish_non_exhaustive()
    }
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(reconciler: Arc<Reconciler>, api: Api<MyAppResource>) -> Self {
        Self { reconciler, api }
    }

    /// Starts watching MyAppResource objects.
    pub async fn watch(&self) -> Result<(), ControllerError> {
        info!("Starting MyAppResource watcher");

        let mut stream = Box::pin(watcher(self.api.clone(), watcher::Config::default()));

        while let Some(event) = stream
            .try_next()
            .await
            .map_err(|e| ControllerError::Watch(format!("Watcher stream error: {e}")))?
        {
            match event {
                watcher::Event::Apply(resource) => {
                    let name = resource.metadata.name.as_deref().unwrap_or("<unknown>");
                    info!("MyAppResource applied: {}", name);

                    if let Err(e) = self.reconcile(&resource).await {
                        error!("Failed to reconcile MyAppResource {}: {}", name, e);
                    }
                }
                watcher::Event::Delete(resource) => {
                    let name = resource.metadata.name.as_deref().unwrap_or("<unknown>");
                    // Children carry owner references; GC removes them
                    info!("MyAppResource deleted: {}", name);
                }
                watcher::Event::Init => {
                    info!("MyAppResource watcher initialized");
                }
                watcher::Event::InitApply(resource) => {
                    let name = resource.metadata.name.as_deref().unwrap_or("<unknown>");
                    debug!("MyAppResource init apply: {}", name);

                    if let Err(e) = self.reconcile(&resource).await {
                        warn!("Failed to reconcile MyAppResource {}: {}", name, e);
                    }
                }
                watcher::Event::InitDone => {
                    info!("MyAppResource watcher initialization complete");
                }
            }
        }

        Ok(())
    }

    /// Routes one applied resource to the create or update path.
    async fn reconcile(&self, resource: &MyAppResource) -> Result<(), ControllerError> {
        let name = resource.metadata.name.as_deref().ok_or_else(|| {
            ControllerError::MissingMetadata("MyAppResource missing name".to_string())
        })?;

        let already_created = resource
            .status
            .as_ref()
            .and_then(|status| status.on_create.as_ref())
            .is_some();

        if already_created {
            self.reconcile_update(resource, name).await
        } else {
            self.reconcile_create(resource, name).await
        }
    }

    async fn reconcile_create(
        &self,
        resource: &MyAppResource,
        name: &str,
    ) -> Result<(), ControllerError> {
        let result = self.reconciler.handle_create(resource).await?;

        let status_patch = json!({"status": {"on_create": result}});
        self.api
            .patch_status(name, &PatchParams::default(), &Patch::Merge(&status_patch))
            .await?;

        self.record_handled_spec(name, &resource.spec).await
    }

    async fn reconcile_update(
        &self,
        resource: &MyAppResource,
        name: &str,
    ) -> Result<(), ControllerError> {
        let Some(old_spec) = last_handled_spec(resource)? else {
            // No record of the previously handled spec (controller replaced
            // mid-lifecycle); baseline it and diff from the next event
            warn!("No last-handled spec for {}, recording baseline", name);
            return self.record_handled_spec(name, &resource.spec).await;
        };

        let diff = spec_diff(&old_spec, &resource.spec)?;
        if diff.is_empty() {
            debug!("No spec changes for {}", name);
            return Ok(());
        }

        let children = self.reconciler.handle_update(resource, &diff).await?;

        let status_patch = json!({"status": {"on_create": {"children": children}}});
        self.api
            .patch_status(name, &PatchParams::default(), &Patch::Merge(&status_patch))
            .await?;

        self.record_handled_spec(name, &resource.spec).await
    }

    async fn record_handled_spec(
        &self,
        name: &str,
        spec: &MyAppResourceSpec,
    ) -> Result<(), ControllerError> {
        let patch = json!({
            "metadata": {
                "annotations": {
                    LAST_HANDLED_ANNOTATION: serde_json::to_string(spec)?,
                }
            }
        });
        self.api
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }
}

/// Parses the last-handled spec from the resource's annotations.
fn last_handled_spec(
    resource: &MyAppResource,
) -> Result<Option<MyAppResourceSpec>, ControllerError> {
    resource
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(LAST_HANDLED_ANNOTATION))
        .map(|raw| serde_json::from_str(raw))
        .transpose()
        .map_err(ControllerError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_resource;
    use std::collections::BTreeMap;

    #[test]
    fn last_handled_spec_parses_the_annotation() {
        let mut resource = test_resource("app", "ns", false);
        let raw = serde_json::to_string(&resource.spec).unwrap();
        resource.metadata.annotations =
            Some(BTreeMap::from([(LAST_HANDLED_ANNOTATION.to_string(), raw)]));

        let parsed = last_handled_spec(&resource).unwrap().unwrap();
        assert_eq!(parsed.image.repository, resource.spec.image.repository);
    }

    #[test]
    fn last_handled_spec_is_none_without_annotation() {
        let resource = test_resource("app", "ns", false);
        assert!(last_handled_spec(&resource).unwrap().is_none());
    }

    #[test]
    fn garbage_annotation_is_an_error() {
        let mut resource = test_resource("app", "ns", false);
        resource.metadata.annotations = Some(BTreeMap::from([(
            LAST_HANDLED_ANNOTATION.to_string(),
            "not json".to_string(),
        )]));
        assert!(last_handled_spec(&resource).is_err());
    }
}
