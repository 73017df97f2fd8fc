/*!

The cluster-manager capability. A [`Provisioner`] creates and deletes local
lab clusters; [`K3d`] is the production implementation shelling out to the
`k3d` CLI. Creation hands back a [`ClusterHandle`] carrying the kubeconfig
path, which is threaded explicitly to every later step instead of relying on
ambient kubeconfig state.

!*/

mod error;
mod k3d;

pub use error::{Error, Result};
pub use k3d::K3d;

use std::path::{Path, PathBuf};

/// A created cluster and the kubeconfig that reaches it.
#[derive(Debug, Clone)]
pub struct ClusterHandle {
    name: String,
    kubeconfig: PathBuf,
}

impl ClusterHandle {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(name: S, kubeconfig: P) -> Self {
        Self {
            name: name.into(),
            kubeconfig: kubeconfig.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kubeconfig(&self) -> &Path {
        &self.kubeconfig
    }
}

/// Cluster lifecycle operations, behind a trait so orchestration logic and
/// readiness checks never depend on a concrete process-invocation mechanism.
#[async_trait::async_trait]
pub trait Provisioner: Send + Sync {
    async fn create_cluster(&self, name: &str) -> Result<ClusterHandle>;

    /// Deleting a cluster that does not exist is a no-op success.
    async fn delete_cluster(&self, name: &str) -> Result<()>;

    async fn list_clusters(&self) -> Result<Vec<String>>;

    async fn cluster_exists(&self, name: &str) -> Result<bool> {
        Ok(self.list_clusters().await?.iter().any(|n| n == name))
    }
}
