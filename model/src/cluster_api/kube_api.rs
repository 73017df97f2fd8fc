use super::error::{self, Result};
use super::{ClusterApi, HttpStatusCode, PodSummary, SecretData};
use crate::system::labeled_namespace;
use k8s_openapi::api::core::v1::{Namespace, Pod, Secret};
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Api, Client, ResourceExt};
use log::trace;
use snafu::ResultExt;

/// The production [`ClusterApi`], backed by a `kube::Client`.
#[derive(Clone)]
pub struct KubeClusterApi {
    client: Client,
}

impl KubeClusterApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }

    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait::async_trait]
impl ClusterApi for KubeClusterApi {
    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        match self.namespaces().get(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e).context(error::KubeSnafu {
                action: format!("get namespace '{}'", name),
            }),
        }
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        let ns = labeled_namespace(name);
        match self.namespaces().create(&PostParams::default(), &ns).await {
            Ok(_) => Ok(()),
            // Already present; the bring-up flow treats this as success.
            Err(e) if e.is_conflict() => {
                trace!("namespace '{}' already exists", name);
                Ok(())
            }
            Err(e) => Err(e).context(error::KubeSnafu {
                action: format!("create namespace '{}'", name),
            }),
        }
    }

    async fn delete_namespace(&self, name: &str) -> Result<bool> {
        match self
            .namespaces()
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e).context(error::KubeSnafu {
                action: format!("delete namespace '{}'", name),
            }),
        }
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<SecretData>> {
        match self.secrets(namespace).get(name).await {
            Ok(secret) => Ok(Some(
                secret
                    .data
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(key, value)| (key, value.0))
                    .collect(),
            )),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e).context(error::KubeSnafu {
                action: format!("get secret '{}/{}'", namespace, name),
            }),
        }
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodSummary>> {
        let pods = self
            .pods(namespace)
            .list(&ListParams::default())
            .await
            .context(error::KubeSnafu {
                action: format!("list pods in namespace '{}'", namespace),
            })?;
        Ok(pods.iter().map(summarize).collect())
    }
}

/// Reduce a pod to the fields readiness decisions are made from.
fn summarize(pod: &Pod) -> PodSummary {
    let status = pod.status.clone().unwrap_or_default();
    let container_statuses = status.container_statuses.unwrap_or_default();
    let total_containers = pod
        .spec
        .as_ref()
        .map(|spec| spec.containers.len())
        .unwrap_or_default();
    let is_ready = status
        .conditions
        .unwrap_or_default()
        .iter()
        .any(|condition| condition.type_ == "Ready" && condition.status == "True");
    PodSummary {
        name: pod.name_any(),
        phase: status.phase.unwrap_or_default(),
        ready_containers: container_statuses.iter().filter(|c| c.ready).count(),
        total_containers,
        is_ready,
    }
}
