use gitopsys_model::cluster_api::{ClusterApi, Error, PodSummary, Result, SecretData};
use gitopsys_model::provisioner::{self, ClusterHandle, Provisioner};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

/// An in-memory stand-in for a cluster. Tests script its state through the
/// mutators and point checks or a manager at it through the [`ClusterApi`]
/// implementation. `fail_requests` makes every subsequent call return a hard
/// error, for exercising fatal paths.
#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    namespaces: BTreeSet<String>,
    secrets: BTreeMap<(String, String), SecretData>,
    pods: BTreeMap<String, Vec<PodSummary>>,
    failure: Option<String>,
}

impl State {
    fn check_reachable(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(Error::unreachable(message.clone())),
            None => Ok(()),
        }
    }
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_namespace(&self, name: &str) {
        self.state.lock().await.namespaces.insert(name.to_string());
    }

    pub async fn put_secret(&self, namespace: &str, name: &str, data: Vec<(&str, Vec<u8>)>) {
        self.state.lock().await.secrets.insert(
            (namespace.to_string(), name.to_string()),
            data.into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        );
    }

    pub async fn add_pod(&self, namespace: &str, pod: PodSummary) {
        self.state
            .lock()
            .await
            .pods
            .entry(namespace.to_string())
            .or_default()
            .push(pod);
    }

    pub async fn set_pod_ready(&self, namespace: &str, name: &str) {
        let mut state = self.state.lock().await;
        if let Some(pods) = state.pods.get_mut(namespace) {
            for pod in pods.iter_mut().filter(|pod| pod.name == name) {
                pod.is_ready = true;
                pod.ready_containers = pod.total_containers;
                pod.phase = "Running".to_string();
            }
        }
    }

    /// Make every subsequent call fail with `message`.
    pub async fn fail_requests(&self, message: &str) {
        self.state.lock().await.failure = Some(message.to_string());
    }

    pub async fn heal(&self) {
        self.state.lock().await.failure = None;
    }
}

#[async_trait::async_trait]
impl ClusterApi for FakeCluster {
    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        let state = self.state.lock().await;
        state.check_reachable()?;
        Ok(state.namespaces.contains(name))
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.check_reachable()?;
        state.namespaces.insert(name.to_string());
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        state.check_reachable()?;
        let existed = state.namespaces.remove(name);
        state.pods.remove(name);
        let stale: Vec<(String, String)> = state
            .secrets
            .keys()
            .filter(|(namespace, _)| namespace == name)
            .cloned()
            .collect();
        for key in stale {
            state.secrets.remove(&key);
        }
        Ok(existed)
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<SecretData>> {
        let state = self.state.lock().await;
        state.check_reachable()?;
        Ok(state
            .secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodSummary>> {
        let state = self.state.lock().await;
        state.check_reachable()?;
        Ok(state.pods.get(namespace).cloned().unwrap_or_default())
    }
}

/// An in-memory stand-in for the cluster manager. Tests script which
/// clusters exist through the mutators (or the [`Provisioner`] operations
/// themselves) and can switch every call to a hard error with
/// `fail_requests`.
#[derive(Default)]
pub struct FakeProvisioner {
    state: Mutex<ProvisionerState>,
}

#[derive(Default)]
struct ProvisionerState {
    clusters: BTreeSet<String>,
    failure: Option<String>,
}

impl ProvisionerState {
    fn check_reachable(&self) -> provisioner::Result<()> {
        match &self.failure {
            Some(message) => Err(provisioner::Error::unreachable(message.clone())),
            None => Ok(()),
        }
    }
}

impl FakeProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_cluster(&self, name: &str) {
        self.state.lock().await.clusters.insert(name.to_string());
    }

    /// Make every subsequent call fail with `message`.
    pub async fn fail_requests(&self, message: &str) {
        self.state.lock().await.failure = Some(message.to_string());
    }
}

#[async_trait::async_trait]
impl Provisioner for FakeProvisioner {
    async fn create_cluster(&self, name: &str) -> provisioner::Result<ClusterHandle> {
        let mut state = self.state.lock().await;
        state.check_reachable()?;
        state.clusters.insert(name.to_string());
        Ok(ClusterHandle::new(name, format!("{}-kubeconfig.yaml", name)))
    }

    async fn delete_cluster(&self, name: &str) -> provisioner::Result<()> {
        let mut state = self.state.lock().await;
        state.check_reachable()?;
        state.clusters.remove(name);
        Ok(())
    }

    async fn list_clusters(&self) -> provisioner::Result<Vec<String>> {
        let state = self.state.lock().await;
        state.check_reachable()?;
        Ok(state.clusters.iter().cloned().collect())
    }
}

/// A pod that reports the `Ready` condition.
pub fn ready_pod(name: &str) -> PodSummary {
    PodSummary {
        name: name.to_string(),
        phase: "Running".to_string(),
        ready_containers: 1,
        total_containers: 1,
        is_ready: true,
    }
}

/// A pod that has been scheduled but is not ready yet.
pub fn pending_pod(name: &str) -> PodSummary {
    PodSummary {
        name: name.to_string(),
        phase: "Pending".to_string(),
        ready_containers: 0,
        total_containers: 1,
        is_ready: false,
    }
}
