use anyhow::{Context, Result};
use clap::Parser;
use model::constants::{DEFAULT_CLUSTER_NAME, DEFAULT_CONTROLLER_NAMESPACE, DEFAULT_K3D_PROGRAM};
use model::provisioner::{K3d, Provisioner};
use std::path::PathBuf;

/// The down subcommand deletes the lab cluster. Deleting a cluster that is
/// already gone succeeds quietly, so cleanup can always be run.
#[derive(Debug, Parser)]
pub(crate) struct Down {
    /// Name of the lab cluster.
    #[clap(long = "cluster", default_value = DEFAULT_CLUSTER_NAME)]
    cluster: String,

    /// Path or name of the k3d binary.
    #[clap(long = "k3d-path", default_value = DEFAULT_K3D_PROGRAM)]
    k3d_path: String,

    /// Remove the lab namespaces but keep the cluster running.
    #[clap(long = "namespaces-only")]
    namespaces_only: bool,

    /// A namespace to remove with `--namespaces-only`. May be repeated.
    #[clap(long = "namespace", short = 'n', default_values = &[DEFAULT_CONTROLLER_NAMESPACE])]
    namespaces: Vec<String>,
}

impl Down {
    pub(crate) async fn run(self, kubeconfig: &Option<PathBuf>) -> Result<()> {
        if self.namespaces_only {
            let client = crate::manager(kubeconfig).await?;
            client
                .uninstall(&self.namespaces)
                .await
                .context("Unable to remove the lab namespaces")?;
            println!("lab namespaces were removed.");
            return Ok(());
        }

        let k3d = K3d::new(&self.k3d_path);
        k3d.delete_cluster(&self.cluster)
            .await
            .context(format!("Unable to delete cluster '{}'", self.cluster))?;

        println!("cluster '{}' was deleted.", self.cluster);
        Ok(())
    }
}
