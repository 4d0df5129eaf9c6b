//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for creating test resources and diff
//! entries.

use crate::diff::{DiffEntry, DiffOp};
use crds::{
    Children, CreateResult, ImageSpec, MyAppResource, MyAppResourceSpec, MyAppResourceStatus,
    RedisSpec, ResourceSpec,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// A well-formed spec with the given redis block.
pub fn test_spec(redis_enabled: Option<bool>) -> MyAppResourceSpec {
    MyAppResourceSpec {
        image: ImageSpec {
            repository: "myrepo".to_string(),
            tag: "v1".to_string(),
        },
        replica_count: 2,
        resources: ResourceSpec {
            cpu_request: "50m".to_string(),
            memory_limit: "64Mi".to_string(),
        },
        ui: None,
        redis: redis_enabled.map(|enabled| RedisSpec { enabled }),
    }
}

/// A parent resource with name, namespace and uid metadata populated.
pub fn test_resource(name: &str, namespace: &str, redis_enabled: bool) -> MyAppResource {
    let mut resource = MyAppResource::new(name, test_spec(Some(redis_enabled)));
    resource.metadata.namespace = Some(namespace.to_string());
    resource.metadata.uid = Some("parent-uid".to_string());
    resource
}

/// Attaches a `status.on_create` subtree to the resource.
pub fn with_created_children(mut resource: MyAppResource, children: Children) -> MyAppResource {
    resource.status = Some(MyAppResourceStatus {
        on_create: Some(CreateResult { children }),
    });
    resource
}

/// A `change` diff entry for the given path.
pub fn change_entry(path: &[&str], old: Value, new: Value) -> DiffEntry {
    DiffEntry {
        op: DiffOp::Change,
        path: path.iter().map(ToString::to_string).collect(),
        old: Some(old),
        new: Some(new),
    }
}

/// An `add` diff entry for the given path.
pub fn add_entry(path: &[&str], new: Value) -> DiffEntry {
    DiffEntry {
        op: DiffOp::Add,
        path: path.iter().map(ToString::to_string).collect(),
        old: None,
        new: Some(new),
    }
}

/// Sets a `PODINFO_UI_*` source map on the spec.
pub fn with_ui(mut resource: MyAppResource, entries: &[(&str, &str)]) -> MyAppResource {
    resource.spec.ui = Some(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<String, String>>(),
    );
    resource
}
