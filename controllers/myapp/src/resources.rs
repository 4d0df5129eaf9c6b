//! Desired-state object builders.
//!
//! Pure construction of the Deployment and Service objects the operator
//! manages, plus the podinfo container environment. No I/O happens here; the
//! reconciler adopts and applies whatever these functions return.

use crds::MyAppResourceSpec;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, PodSpec, PodTemplateSpec, ResourceRequirements, Service,
    ServicePort, ServiceSpec,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use std::collections::BTreeMap;

/// Name shared by the podinfo Deployment, Service and container.
pub const PODINFO_NAME: &str = "podinfo";
/// Port podinfo listens on.
pub const PODINFO_PORT: i32 = 9898;
/// Name shared by the redis Deployment, Service and container.
pub const REDIS_NAME: &str = "redis";
/// Port redis listens on.
pub const REDIS_PORT: i32 = 6379;
/// Fixed redis image repository.
pub const REDIS_IMAGE_REPO: &str = "redis";
/// Fixed redis image tag.
pub const REDIS_IMAGE_TAG: &str = "7.0.12";

/// Label key selecting a component's pods.
pub const APP_LABEL: &str = "app.kubernetes.io/name";
/// Env var pointing podinfo at the redis cache.
pub const CACHE_SERVER_ENV: &str = "PODINFO_CACHE_SERVER";

/// Pod-selection labels for a component.
#[must_use]
pub fn app_labels(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(APP_LABEL.to_string(), name.to_string())])
}

/// Builds a Deployment: one container named `name` with image `repo:tag`,
/// pod template and selector labeled `app.kubernetes.io/name=<name>`.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn deployment_object(
    name: &str,
    namespace: &str,
    image_repo: &str,
    image_tag: &str,
    replicas: i32,
    resources: ResourceRequirements,
    expose_port: Option<i32>,
    env_vars: Option<Vec<EnvVar>>,
) -> Deployment {
    let labels = app_labels(name);

    let container = Container {
        name: name.to_string(),
        image: Some(format!("{image_repo}:{image_tag}")),
        ports: expose_port.map(|port| {
            vec![ContainerPort {
                container_port: port,
                ..Default::default()
            }]
        }),
        resources: Some(resources),
        env: env_vars,
        ..Default::default()
    };

    let template = PodTemplateSpec {
        metadata: Some(ObjectMeta {
            labels: Some(labels.clone()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }),
        spec: Some(PodSpec {
            containers: vec![container],
            ..Default::default()
        }),
    };

    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(replicas),
            selector: LabelSelector {
                match_labels: Some(labels),
                ..Default::default()
            },
            template,
            ..Default::default()
        }),
        status: None,
    }
}

/// Builds a ClusterIP Service.
///
/// The selector has to match the Deployment's pod label for traffic to
/// route; that coupling is the caller's responsibility.
#[must_use]
pub fn service_object(
    name: &str,
    namespace: &str,
    ports: Vec<ServicePort>,
    selector: BTreeMap<String, String>,
) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            selector: Some(selector),
            ports: Some(ports),
            ..Default::default()
        }),
        status: None,
    }
}

/// Podinfo container environment: the cache-server var first, then one
/// `PODINFO_UI_<KEY>` var per `ui` entry in key order.
///
/// TODO: only point PODINFO_CACHE_SERVER at redis when redis.enabled is
/// true, otherwise set it to an empty string.
#[must_use]
pub fn podinfo_env(spec: &MyAppResourceSpec) -> Vec<EnvVar> {
    let mut env = vec![EnvVar {
        name: CACHE_SERVER_ENV.to_string(),
        value: Some(format!("tcp://{REDIS_NAME}:{REDIS_PORT}")),
        ..Default::default()
    }];
    if let Some(ui) = &spec.ui {
        env.extend(ui.iter().map(|(key, value)| EnvVar {
            name: format!("PODINFO_UI_{}", key.to_uppercase()),
            value: Some(value.clone()),
            ..Default::default()
        }));
    }
    env
}

/// Resource requirements for the podinfo container, taken from the spec.
#[must_use]
pub fn podinfo_resources(spec: &MyAppResourceSpec) -> ResourceRequirements {
    ResourceRequirements {
        requests: Some(BTreeMap::from([(
            "cpu".to_string(),
            Quantity(spec.resources.cpu_request.clone()),
        )])),
        limits: Some(BTreeMap::from([(
            "memory".to_string(),
            Quantity(spec.resources.memory_limit.clone()),
        )])),
        ..Default::default()
    }
}

/// Fixed minimal resource profile for the redis container.
#[must_use]
pub fn redis_resources() -> ResourceRequirements {
    ResourceRequirements {
        requests: Some(BTreeMap::from([
            ("cpu".to_string(), Quantity("100m".to_string())),
            ("memory".to_string(), Quantity("32Mi".to_string())),
        ])),
        limits: Some(BTreeMap::from([
            ("cpu".to_string(), Quantity("1000m".to_string())),
            ("memory".to_string(), Quantity("128Mi".to_string())),
        ])),
        ..Default::default()
    }
}
