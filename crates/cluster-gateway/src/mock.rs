//! Mock ClusterGateway for unit testing
//!
//! This module provides a mock implementation of ClusterGateway that can be
//! used in unit tests without requiring a running cluster. Objects live in
//! in-memory maps; every mutating call is recorded so tests can assert on
//! exactly which API calls a reconciliation issued.

use crate::error::GatewayError;
use crate::gateway_trait::ClusterGateway;
use crate::outcome::{Applied, Teardown};
use chrono::TimeZone;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// One recorded gateway call, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// `create_or_update_deployment` was invoked
    CreateOrUpdateDeployment {
        /// Target namespace
        namespace: String,
        /// Deployment name
        name: String,
    },
    /// `create_or_update_service` was invoked
    CreateOrUpdateService {
        /// Target namespace
        namespace: String,
        /// Service name
        name: String,
    },
    /// `teardown_deployment` was invoked
    TeardownDeployment {
        /// Target namespace
        namespace: String,
        /// Deployment name
        name: String,
    },
    /// `teardown_service` was invoked
    TeardownService {
        /// Target namespace
        namespace: String,
        /// Service name
        name: String,
    },
}

/// Mock ClusterGateway for testing
///
/// Stores Deployments and Services in memory, keyed by `(namespace, name)`.
/// Created objects get a fresh UID and a fixed creation timestamp; a second
/// upsert of the same name takes the `Patched` path and preserves both.
#[derive(Clone, Default)]
pub struct MockClusterGateway {
    deployments: Arc<Mutex<HashMap<(String, String), Deployment>>>,
    services: Arc<Mutex<HashMap<(String, String), Service>>>,
    calls: Arc<Mutex<Vec<GatewayCall>>>,
    // When set, the next call fails with this message
    fail_next: Arc<Mutex<Option<String>>>,
}

impl std::fmt::Debug for MockClusterGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockClusterGateway").finish_non_exhaustive()
    }
}

impl MockClusterGateway {
    /// Create a new empty mock gateway
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed creation timestamp stamped onto created objects.
    #[must_use]
    pub fn creation_time() -> Time {
        // Any stable instant works; tests only compare formatting
        Time(chrono::Utc.with_ymd_and_hms(2023, 7, 29, 1, 8, 24).unwrap())
    }

    /// Seed a Deployment into the mock store (for test setup)
    pub fn add_deployment(&self, namespace: &str, name: &str, deployment: Deployment) {
        self.deployments
            .lock()
            .unwrap()
            .insert((namespace.to_string(), name.to_string()), deployment);
    }

    /// Make the next gateway call fail with the given message
    pub fn fail_next_call(&self, message: &str) {
        *self.fail_next.lock().unwrap() = Some(message.to_string());
    }

    /// All recorded mutating calls, in order
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Stored Deployment, if any
    #[must_use]
    pub fn deployment(&self, namespace: &str, name: &str) -> Option<Deployment> {
        self.deployments
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Stored Service, if any
    #[must_use]
    pub fn service(&self, namespace: &str, name: &str) -> Option<Service> {
        self.services
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Number of stored Deployments
    #[must_use]
    pub fn deployment_count(&self) -> usize {
        self.deployments.lock().unwrap().len()
    }

    /// Number of stored Services
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.lock().unwrap().len()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_fail(&self) -> Result<(), GatewayError> {
        match self.fail_next.lock().unwrap().take() {
            Some(message) => Err(GatewayError::Api(message)),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ClusterGateway for MockClusterGateway {
    async fn create_or_update_deployment(
        &self,
        namespace: &str,
        name: &str,
        mut desired: Deployment,
    ) -> Result<Applied<Deployment>, GatewayError> {
        self.record(GatewayCall::CreateOrUpdateDeployment {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        self.check_fail()?;

        let key = (namespace.to_string(), name.to_string());
        let mut deployments = self.deployments.lock().unwrap();
        match deployments.get(&key) {
            Some(existing) => {
                // Patch path: the live object keeps its identity
                desired.metadata.uid = existing.metadata.uid.clone();
                desired.metadata.creation_timestamp = existing.metadata.creation_timestamp.clone();
                deployments.insert(key, desired.clone());
                Ok(Applied::Patched(desired))
            }
            None => {
                desired.metadata.uid = Some(Uuid::new_v4().to_string());
                desired.metadata.creation_timestamp = Some(Self::creation_time());
                deployments.insert(key, desired.clone());
                Ok(Applied::Created(desired))
            }
        }
    }

    async fn create_or_update_service(
        &self,
        namespace: &str,
        name: &str,
        mut desired: Service,
    ) -> Result<Applied<Service>, GatewayError> {
        self.record(GatewayCall::CreateOrUpdateService {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        self.check_fail()?;

        let key = (namespace.to_string(), name.to_string());
        let mut services = self.services.lock().unwrap();
        match services.get(&key) {
            Some(existing) => {
                desired.metadata.uid = existing.metadata.uid.clone();
                desired.metadata.creation_timestamp = existing.metadata.creation_timestamp.clone();
                services.insert(key, desired.clone());
                Ok(Applied::Patched(desired))
            }
            None => {
                desired.metadata.uid = Some(Uuid::new_v4().to_string());
                desired.metadata.creation_timestamp = Some(Self::creation_time());
                services.insert(key, desired.clone());
                Ok(Applied::Created(desired))
            }
        }
    }

    async fn teardown_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Teardown, GatewayError> {
        self.record(GatewayCall::TeardownDeployment {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        self.check_fail()?;

        let key = (namespace.to_string(), name.to_string());
        match self.deployments.lock().unwrap().remove(&key) {
            Some(_) => Ok(Teardown::Deleted),
            None => Ok(Teardown::AlreadyAbsent),
        }
    }

    async fn teardown_service(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Teardown, GatewayError> {
        self.record(GatewayCall::TeardownService {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
        self.check_fail()?;

        let key = (namespace.to_string(), name.to_string());
        match self.services.lock().unwrap().remove(&key) {
            Some(_) => Ok(Teardown::Deleted),
            None => Ok(Teardown::AlreadyAbsent),
        }
    }

    async fn get_deployment_by_name(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Deployment>, GatewayError> {
        self.check_fail()?;

        // Mirror the real gateway: list the namespace and scan for the name
        let deployments = self.deployments.lock().unwrap();
        Ok(deployments
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, d)| d)
            .find(|d| d.metadata.name.as_deref() == Some(name))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn named_deployment(name: &str) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn second_upsert_patches_and_keeps_uid() {
        let mock = MockClusterGateway::new();
        let first = mock
            .create_or_update_deployment("ns", "podinfo", named_deployment("podinfo"))
            .await
            .unwrap();
        assert!(first.was_created());
        let uid = first.into_inner().metadata.uid;

        let second = mock
            .create_or_update_deployment("ns", "podinfo", named_deployment("podinfo"))
            .await
            .unwrap();
        assert!(!second.was_created());
        assert_eq!(second.into_inner().metadata.uid, uid);
    }

    #[tokio::test]
    async fn teardown_absent_is_already_absent() {
        let mock = MockClusterGateway::new();
        let outcome = mock.teardown_deployment("ns", "missing").await.unwrap();
        assert_eq!(outcome, Teardown::AlreadyAbsent);
    }

    #[tokio::test]
    async fn lookup_scans_only_the_namespace() {
        let mock = MockClusterGateway::new();
        mock.add_deployment("other", "podinfo", named_deployment("podinfo"));
        assert!(mock
            .get_deployment_by_name("ns", "podinfo")
            .await
            .unwrap()
            .is_none());
        assert!(mock
            .get_deployment_by_name("other", "podinfo")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn injected_failure_surfaces_once() {
        let mock = MockClusterGateway::new();
        mock.fail_next_call("boom");
        assert!(mock
            .create_or_update_deployment("ns", "podinfo", named_deployment("podinfo"))
            .await
            .is_err());
        assert!(mock
            .create_or_update_deployment("ns", "podinfo", named_deployment("podinfo"))
            .await
            .is_ok());
    }
}
