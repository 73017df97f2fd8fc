/*!

The orchestration-API capability. Everything the readiness checks and the
bootstrap manager need to ask of a Kubernetes cluster goes through the
[`ClusterApi`] trait so that it can be faked in tests; only
[`KubeClusterApi`] talks to a real API server.

!*/

mod error;
mod http_status_code;
mod kube_api;

pub use error::{Error, Result};
pub use http_status_code::HttpStatusCode;
pub use kube_api::KubeClusterApi;

use serde::Serialize;
use std::collections::BTreeMap;

/// The decoded `data` of a secret, keyed by entry name.
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// A cluster's view of one pod, reduced to what readiness decisions need.
#[derive(Debug, Clone, Serialize)]
pub struct PodSummary {
    pub name: String,
    /// The pod phase as reported by the cluster, e.g. `Running`.
    pub phase: String,
    pub ready_containers: usize,
    pub total_containers: usize,
    /// Whether the pod reports the `Ready` condition.
    pub is_ready: bool,
}

/// The operations the bootstrap flow performs against a cluster.
///
/// Reads of missing objects are not errors: they return `None`/`false` so
/// that checks can report "not yet ready". Creating a namespace that already
/// exists succeeds without change, matching the idempotency the original
/// bring-up flow relies on.
#[async_trait::async_trait]
pub trait ClusterApi: Send + Sync {
    async fn namespace_exists(&self, name: &str) -> Result<bool>;

    async fn create_namespace(&self, name: &str) -> Result<()>;

    /// Returns whether the namespace existed.
    async fn delete_namespace(&self, name: &str) -> Result<bool>;

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<SecretData>>;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodSummary>>;
}
