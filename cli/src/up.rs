use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use model::bootstrap::BootstrapManager;
use model::checks::ClusterExists;
use model::constants::{DEFAULT_CLUSTER_NAME, DEFAULT_CONTROLLER_NAMESPACE, DEFAULT_K3D_PROGRAM};
use model::provisioner::{K3d, Provisioner};
use model::wait::{Check, CheckState};

/// The up subcommand creates the lab cluster and its namespaces. If the
/// cluster already exists it is reused as-is.
#[derive(Debug, Parser)]
pub(crate) struct Up {
    /// Name of the lab cluster.
    #[clap(long = "cluster", default_value = DEFAULT_CLUSTER_NAME)]
    cluster: String,

    /// Namespace the GitOps controller will be installed into.
    #[clap(long = "controller-namespace", default_value = DEFAULT_CONTROLLER_NAMESPACE)]
    controller_namespace: String,

    /// An additional namespace to create, e.g. for the deployed application. May be repeated.
    #[clap(long = "namespace", short = 'n')]
    namespaces: Vec<String>,

    /// Path or name of the k3d binary.
    #[clap(long = "k3d-path", default_value = DEFAULT_K3D_PROGRAM)]
    k3d_path: String,
}

impl Up {
    pub(crate) async fn run(self) -> Result<()> {
        let k3d = K3d::new(&self.k3d_path);
        let exists = matches!(
            ClusterExists::new(&k3d, &self.cluster)
                .evaluate()
                .await
                .context("Unable to list clusters")?,
            CheckState::Ready(())
        );
        let handle = if exists {
            info!("cluster '{}' already exists, reusing it", self.cluster);
            k3d.write_kubeconfig(&self.cluster)
                .await
                .context("Unable to locate the kubeconfig of the existing cluster")?
        } else {
            k3d.create_cluster(&self.cluster)
                .await
                .context(format!("Unable to create cluster '{}'", self.cluster))?
        };

        let client = BootstrapManager::new_from_cluster(&handle)
            .await
            .context("Unable to create a client for the new cluster")?;
        client
            .create_namespace(&self.controller_namespace)
            .await
            .context(format!(
                "Unable to create namespace '{}'",
                self.controller_namespace
            ))?;
        for namespace in &self.namespaces {
            client
                .create_namespace(namespace)
                .await
                .context(format!("Unable to create namespace '{}'", namespace))?;
        }

        println!("cluster '{}' is up.", handle.name());
        println!("kubeconfig: {}", handle.kubeconfig().display());
        Ok(())
    }
}
