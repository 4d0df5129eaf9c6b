//! Kubernetes Cluster Gateway
//!
//! Thin idempotent wrappers around the Kubernetes API for the Deployments and
//! Services managed by the MyApp operator. This crate is the operator's sole
//! I/O boundary to the cluster: create-or-patch upserts, idempotent
//! teardowns, and a lookup-by-name query.
//!
//! Conflict (409) and not-found (404) are the only expected error shapes and
//! are folded into explicit outcome variants ([`Applied`], [`Teardown`])
//! rather than surfaced as errors. Everything else propagates as
//! [`GatewayError`] so the caller can fail the reconciliation attempt.
//!
//! # Example
//!
//! ```no_run
//! use cluster_gateway::{ClusterGateway, KubeGateway};
//! use k8s_openapi::api::apps::v1::Deployment;
//!
//! # async fn example(desired: Deployment) -> Result<(), Box<dyn std::error::Error>> {
//! let client = kube::Client::try_default().await?;
//! let gateway = KubeGateway::new(client);
//!
//! // Upsert: create, or patch if it already exists
//! let applied = gateway
//!     .create_or_update_deployment("default", "podinfo", desired)
//!     .await?;
//! let live = applied.into_inner();
//!
//! // Idempotent delete: absent is success
//! gateway.teardown_deployment("default", "podinfo").await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod gateway;
pub mod outcome;
#[path = "trait.rs"]
pub mod gateway_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use error::GatewayError;
pub use gateway::KubeGateway;
pub use gateway_trait::ClusterGateway;
pub use outcome::{Applied, Teardown};
#[cfg(feature = "test-util")]
pub use mock::{GatewayCall, MockClusterGateway};
