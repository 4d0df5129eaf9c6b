//! Controller-specific error types.
//!
//! This module defines error types specific to the MyApp controller that are
//! not covered by upstream library errors.

use cluster_gateway::GatewayError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the MyApp controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Cluster gateway error
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Required object metadata (name, namespace, uid) is missing
    #[error("missing metadata: {0}")]
    MissingMetadata(String),

    /// Resource watch failed
    #[error("resource watch failed: {0}")]
    Watch(String),
}
