//! MyAppResource CRD
//!
//! Declares a podinfo application instance, optionally backed by a redis
//! cache. The operator reconciles one Deployment+Service pair per enabled
//! component.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "my.api.group",
    version = "v1alpha1",
    kind = "MyAppResource",
    namespaced,
    status = "MyAppResourceStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct MyAppResourceSpec {
    /// Container image for the podinfo deployment
    pub image: ImageSpec,

    /// Number of podinfo replicas
    pub replica_count: i32,

    /// Resource requests/limits for the podinfo container
    pub resources: ResourceSpec,

    /// Free-form UI settings, surfaced as PODINFO_UI_* env vars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui: Option<BTreeMap<String, String>>,

    /// Optional redis cache component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis: Option<RedisSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageSpec {
    /// Container registry/repository of the image
    pub repository: String,

    /// Image tag
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    /// CPU request for the container (e.g. "100m")
    pub cpu_request: String,

    /// Memory limit for the container (e.g. "64Mi")
    pub memory_limit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedisSpec {
    /// Whether the redis component should be deployed
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct MyAppResourceStatus {
    /// Result of the create handler, keyed under `status.on_create`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_create: Option<CreateResult>,
}

/// Subtree persisted by the framework glue after the create handler runs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
pub struct CreateResult {
    /// Per-component child status
    pub children: Children,
}

/// Status of the managed child workloads, keyed by component name.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Children {
    /// Redis Deployment+Service status
    pub redis: ChildStatus,

    /// Podinfo Deployment+Service status
    pub pod_info: ChildStatus,
}

/// Creation metadata for one managed child workload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ChildStatus {
    /// Human-readable creation timestamp of the live Deployment
    pub created_on: String,

    /// UID of the live Deployment
    pub uid: String,
}

impl Default for ChildStatus {
    fn default() -> Self {
        Self {
            created_on: "Not Created".to_string(),
            uid: String::new(),
        }
    }
}

impl ChildStatus {
    /// Whether this child has been created in the cluster.
    #[must_use]
    pub fn is_created(&self) -> bool {
        !self.uid.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_child_status_is_uncreated() {
        let status = ChildStatus::default();
        assert_eq!(status.created_on, "Not Created");
        assert_eq!(status.uid, "");
        assert!(!status.is_created());
    }

    #[test]
    fn spec_deserializes_camel_case() {
        let spec: MyAppResourceSpec = serde_json::from_value(serde_json::json!({
            "image": {"repository": "myrepo", "tag": "v1"},
            "replicaCount": 2,
            "resources": {"cpuRequest": "50m", "memoryLimit": "64Mi"},
            "redis": {"enabled": true},
        }))
        .unwrap();
        assert_eq!(spec.image.repository, "myrepo");
        assert_eq!(spec.replica_count, 2);
        assert_eq!(spec.resources.memory_limit, "64Mi");
        assert!(spec.redis.unwrap().enabled);
        assert!(spec.ui.is_none());
    }

    #[test]
    fn children_serialize_with_pod_info_key() {
        let children = Children::default();
        let value = serde_json::to_value(&children).unwrap();
        assert!(value.get("podInfo").is_some());
        assert!(value.get("redis").is_some());
        assert_eq!(value["podInfo"]["created_on"], "Not Created");
    }
}
