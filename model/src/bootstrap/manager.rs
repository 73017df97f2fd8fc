use super::status::NamespaceStatus;
use super::{error, Credentials, Result, StatusSnapshot};
use crate::checks::{NamespaceAbsent, NamespaceReady, PodsReady, SecretAvailable};
use crate::cluster_api::{ClusterApi, KubeClusterApi, PodSummary};
use crate::constants::ADMIN_SECRET_NAME;
use crate::provisioner::ClusterHandle;
use crate::wait::{poll, PollOutcome, PollPolicy};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use log::info;
use snafu::ResultExt;
use std::path::Path;
use std::time::Duration;

/// Orchestrates the bring-up steps against one cluster. Holds nothing but
/// the API client; it is constructed from a [`ClusterHandle`] (or the
/// ambient kubeconfig) and dropped when the flow is done.
pub struct BootstrapManager {
    pub k8s_client: Client,
}

impl BootstrapManager {
    /// Create a `BootstrapManager` from the path to a kubeconfig file.
    pub async fn new_from_kubeconfig_path(kubeconfig_path: &Path) -> Result<Self> {
        let kubeconfig = Kubeconfig::read_from(kubeconfig_path).context(error::ConfigReadSnafu)?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .context(error::ClientCreateKubeconfigSnafu)?;
        Ok(Self {
            k8s_client: config.try_into().context(error::KubeSnafu {
                action: "create client from `Kubeconfig`",
            })?,
        })
    }

    /// Create a `BootstrapManager` for the cluster a provisioner handed back.
    pub async fn new_from_cluster(handle: &ClusterHandle) -> Result<Self> {
        Self::new_from_kubeconfig_path(handle.kubeconfig()).await
    }

    /// Create a `BootstrapManager` using the default `kube::Client`.
    pub async fn new() -> Result<Self> {
        Ok(Self {
            k8s_client: Client::try_default()
                .await
                .context(error::ClientCreateSnafu)?,
        })
    }

    /// The cluster API capability for this manager's cluster.
    pub fn cluster_api(&self) -> KubeClusterApi {
        KubeClusterApi::new(self.k8s_client.clone())
    }

    /// Create a namespace (a no-op if it already exists) and give the object
    /// enough time to settle before returning.
    pub async fn create_namespace(&self, name: &str) -> Result<()> {
        let api = self.cluster_api();
        api.create_namespace(name).await.context(error::ApiSnafu {
            action: format!("create namespace '{}'", name),
        })?;

        let check = NamespaceReady::new(&api, name);
        let policy = PollPolicy::new(Duration::from_millis(50), Duration::from_secs(2));
        self.expect_ready(poll(&check, &policy).await, || {
            format!("namespace '{}'", name)
        })?;
        info!("namespace '{}' is present", name);
        Ok(())
    }

    /// Retrieve the GitOps controller's initial admin credentials, waiting
    /// for the secret to appear. The credentials are returned to the caller;
    /// they are never written anywhere.
    pub async fn admin_credentials(
        &self,
        namespace: &str,
        policy: &PollPolicy,
    ) -> Result<Credentials> {
        let api = self.cluster_api();
        let check = SecretAvailable::new(&api, namespace, ADMIN_SECRET_NAME);
        let data = self.expect_ready(poll(&check, policy).await, || {
            format!("secret '{}/{}'", namespace, ADMIN_SECRET_NAME)
        })?;
        Credentials::from_secret_data(&data)
    }

    /// Wait (bounded) for every pod in `namespace` to report ready. The
    /// outcome is returned as-is: a timeout here is advisory and the caller
    /// decides what to do with it.
    pub async fn wait_for_pods(
        &self,
        namespace: &str,
        policy: &PollPolicy,
    ) -> PollOutcome<Vec<PodSummary>> {
        let api = self.cluster_api();
        poll(&PodsReady::new(&api, namespace), policy).await
    }

    /// Collect the pods of each namespace into a snapshot that can be
    /// rendered as a table or as JSON.
    pub async fn status(&self, namespaces: &[String]) -> Result<StatusSnapshot> {
        let api = self.cluster_api();
        let mut statuses = Vec::new();
        for namespace in namespaces {
            let pods = api.list_pods(namespace).await.context(error::ApiSnafu {
                action: format!("list pods in namespace '{}'", namespace),
            })?;
            statuses.push(NamespaceStatus {
                name: namespace.clone(),
                pods,
            });
        }
        Ok(StatusSnapshot::new(statuses))
    }

    /// Delete the given namespaces and wait for each deletion to complete.
    /// Namespaces that are already gone are skipped.
    pub async fn uninstall(&self, namespaces: &[String]) -> Result<()> {
        let api = self.cluster_api();
        for namespace in namespaces {
            let existed = api
                .delete_namespace(namespace)
                .await
                .context(error::ApiSnafu {
                    action: format!("delete namespace '{}'", namespace),
                })?;
            if !existed {
                info!("namespace '{}' was not present", namespace);
                continue;
            }

            // Namespace deletion completes asynchronously.
            let check = NamespaceAbsent::new(&api, namespace);
            let policy = PollPolicy::new(Duration::from_secs(2), Duration::from_secs(120));
            self.expect_ready(poll(&check, &policy).await, || {
                format!("deletion of namespace '{}'", namespace)
            })?;
            info!("namespace '{}' has been removed", namespace);
        }
        Ok(())
    }

    /// Turn a poll outcome into a `Result` for the operations where not
    /// becoming ready in time is fatal rather than advisory.
    fn expect_ready<T, F>(&self, outcome: PollOutcome<T>, what: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        match outcome {
            PollOutcome::Ready(payload) => Ok(payload),
            PollOutcome::TimedOut { last, waited, .. } => error::WaitTimeoutSnafu {
                what: what(),
                waited,
                last,
            }
            .fail(),
            PollOutcome::Failed { check, source } => Err(error::Error::Check { check, source }),
        }
    }
}
