//! Cluster gateway errors

use thiserror::Error;

/// Errors that can occur when talking to the cluster API.
///
/// Conflict-on-create and not-found-on-delete never appear here; those are
/// encoded as [`crate::Applied::Patched`] and
/// [`crate::Teardown::AlreadyAbsent`] respectively.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Kubernetes API error (auth, validation, server, network)
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Cluster API returned an error outside the kube error taxonomy
    #[error("cluster API error: {0}")]
    Api(String),
}
