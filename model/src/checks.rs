/*!

The concrete readiness checks used during cluster bring-up, one per external
condition the original flow waited on. Each check implements [`Check`] and
depends only on a capability trait ([`Provisioner`] or [`ClusterApi`]), never
on a concrete process or API client, so all of them can be evaluated against
the fakes in `selftest`.

!*/

use crate::cluster_api::{ClusterApi, PodSummary, SecretData};
use crate::provisioner::Provisioner;
use crate::wait::{Check, CheckError, CheckState};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Resolves a program on the `PATH` (or an explicit search path), the way a
/// shell would. A missing tool is a hard error, not a "not yet ready" state:
/// nothing about waiting will make it appear.
pub struct ToolInstalled {
    program: String,
    search_path: Option<OsString>,
}

impl ToolInstalled {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            search_path: None,
        }
    }

    /// Search `path` instead of the `PATH` environment variable.
    pub fn with_search_path<S, P>(program: S, path: P) -> Self
    where
        S: Into<String>,
        P: Into<OsString>,
    {
        Self {
            program: program.into(),
            search_path: Some(path.into()),
        }
    }

    fn resolve(&self) -> Option<PathBuf> {
        let search_path = match &self.search_path {
            Some(path) => Some(path.clone()),
            None => std::env::var_os("PATH"),
        }?;
        std::env::split_paths(&search_path)
            .map(|dir| dir.join(&self.program))
            .find(|candidate| is_executable(candidate))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[async_trait::async_trait]
impl Check for ToolInstalled {
    type Ready = PathBuf;

    fn id(&self) -> &str {
        "tool-installed"
    }

    async fn evaluate(&self) -> Result<CheckState<PathBuf>, CheckError> {
        match self.resolve() {
            Some(path) => Ok(CheckState::Ready(path)),
            None => Err(CheckError::message(format!(
                "'{}' was not found on the PATH; install it before continuing",
                self.program
            ))),
        }
    }
}

/// Ready once the named cluster appears in the cluster manager's listing.
pub struct ClusterExists<'a> {
    provisioner: &'a dyn Provisioner,
    name: &'a str,
}

impl<'a> ClusterExists<'a> {
    pub fn new(provisioner: &'a dyn Provisioner, name: &'a str) -> Self {
        Self { provisioner, name }
    }
}

#[async_trait::async_trait]
impl Check for ClusterExists<'_> {
    type Ready = ();

    fn id(&self) -> &str {
        "cluster-exists"
    }

    async fn evaluate(&self) -> Result<CheckState<()>, CheckError> {
        let exists = self
            .provisioner
            .cluster_exists(self.name)
            .await
            .map_err(|e| CheckError::query("unable to list clusters", e))?;
        if exists {
            Ok(CheckState::Ready(()))
        } else {
            Ok(CheckState::NotReady(format!(
                "cluster '{}' is not in the listing",
                self.name
            )))
        }
    }
}

/// Ready once the namespace object exists.
pub struct NamespaceReady<'a> {
    api: &'a dyn ClusterApi,
    namespace: &'a str,
}

impl<'a> NamespaceReady<'a> {
    pub fn new(api: &'a dyn ClusterApi, namespace: &'a str) -> Self {
        Self { api, namespace }
    }
}

#[async_trait::async_trait]
impl Check for NamespaceReady<'_> {
    type Ready = ();

    fn id(&self) -> &str {
        "namespace-ready"
    }

    async fn evaluate(&self) -> Result<CheckState<()>, CheckError> {
        let exists = self
            .api
            .namespace_exists(self.namespace)
            .await
            .map_err(|e| CheckError::query("unable to get namespace", e))?;
        if exists {
            Ok(CheckState::Ready(()))
        } else {
            Ok(CheckState::NotReady(format!(
                "namespace '{}' does not exist yet",
                self.namespace
            )))
        }
    }
}

/// Ready once the namespace object is gone. Used when tearing down, since
/// namespace deletion completes asynchronously.
pub struct NamespaceAbsent<'a> {
    api: &'a dyn ClusterApi,
    namespace: &'a str,
}

impl<'a> NamespaceAbsent<'a> {
    pub fn new(api: &'a dyn ClusterApi, namespace: &'a str) -> Self {
        Self { api, namespace }
    }
}

#[async_trait::async_trait]
impl Check for NamespaceAbsent<'_> {
    type Ready = ();

    fn id(&self) -> &str {
        "namespace-absent"
    }

    async fn evaluate(&self) -> Result<CheckState<()>, CheckError> {
        let exists = self
            .api
            .namespace_exists(self.namespace)
            .await
            .map_err(|e| CheckError::query("unable to get namespace", e))?;
        if exists {
            Ok(CheckState::NotReady(format!(
                "namespace '{}' is still terminating",
                self.namespace
            )))
        } else {
            Ok(CheckState::Ready(()))
        }
    }
}

/// Ready once the named secret exists; the payload is its decoded data.
pub struct SecretAvailable<'a> {
    api: &'a dyn ClusterApi,
    namespace: &'a str,
    name: &'a str,
}

impl<'a> SecretAvailable<'a> {
    pub fn new(api: &'a dyn ClusterApi, namespace: &'a str, name: &'a str) -> Self {
        Self {
            api,
            namespace,
            name,
        }
    }
}

#[async_trait::async_trait]
impl Check for SecretAvailable<'_> {
    type Ready = SecretData;

    fn id(&self) -> &str {
        "secret-available"
    }

    async fn evaluate(&self) -> Result<CheckState<SecretData>, CheckError> {
        let secret = self
            .api
            .get_secret(self.namespace, self.name)
            .await
            .map_err(|e| CheckError::query("unable to get secret", e))?;
        match secret {
            Some(data) => Ok(CheckState::Ready(data)),
            None => Ok(CheckState::NotReady(format!(
                "secret '{}/{}' has not been created yet",
                self.namespace, self.name
            ))),
        }
    }
}

/// Ready once every pod in the namespace reports the `Ready` condition; the
/// payload is the pod summaries. An empty namespace is not ready, since the
/// pods being waited for have not been scheduled yet.
pub struct PodsReady<'a> {
    api: &'a dyn ClusterApi,
    namespace: &'a str,
}

impl<'a> PodsReady<'a> {
    pub fn new(api: &'a dyn ClusterApi, namespace: &'a str) -> Self {
        Self { api, namespace }
    }
}

#[async_trait::async_trait]
impl Check for PodsReady<'_> {
    type Ready = Vec<PodSummary>;

    fn id(&self) -> &str {
        "pods-ready"
    }

    async fn evaluate(&self) -> Result<CheckState<Vec<PodSummary>>, CheckError> {
        let pods = self
            .api
            .list_pods(self.namespace)
            .await
            .map_err(|e| CheckError::query("unable to list pods", e))?;
        if pods.is_empty() {
            return Ok(CheckState::NotReady(format!(
                "no pods have been scheduled in namespace '{}' yet",
                self.namespace
            )));
        }
        let waiting: Vec<&str> = pods
            .iter()
            .filter(|pod| !pod.is_ready)
            .map(|pod| pod.name.as_str())
            .collect();
        if waiting.is_empty() {
            Ok(CheckState::Ready(pods))
        } else {
            Ok(CheckState::NotReady(format!(
                "{} of {} pods ready, waiting on: {}",
                pods.len() - waiting.len(),
                pods.len(),
                waiting.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod test {
    use gitopsys_model::checks::{
        ClusterExists, NamespaceReady, PodsReady, SecretAvailable, ToolInstalled,
    };
    use gitopsys_model::wait::{Check, CheckState};
    use selftest::{pending_pod, ready_pod, FakeCluster, FakeProvisioner};

    #[tokio::test]
    async fn cluster_exists_follows_the_listing() {
        let provisioner = FakeProvisioner::new();
        let check = ClusterExists::new(&provisioner, "gitopsys");
        assert!(matches!(
            check.evaluate().await.unwrap(),
            CheckState::NotReady(_)
        ));
        provisioner.add_cluster("gitopsys").await;
        assert!(matches!(
            check.evaluate().await.unwrap(),
            CheckState::Ready(())
        ));
    }

    #[tokio::test]
    async fn an_unreachable_cluster_manager_is_a_hard_error() {
        let provisioner = FakeProvisioner::new();
        provisioner
            .fail_requests("dial tcp: connection refused")
            .await;
        let check = ClusterExists::new(&provisioner, "gitopsys");
        let error = check.evaluate().await.unwrap_err();
        assert!(error.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn namespace_ready_follows_cluster_state() {
        let cluster = FakeCluster::new();
        let check = NamespaceReady::new(&cluster, "argocd");
        assert!(matches!(
            check.evaluate().await.unwrap(),
            CheckState::NotReady(_)
        ));
        cluster.add_namespace("argocd").await;
        assert!(matches!(
            check.evaluate().await.unwrap(),
            CheckState::Ready(())
        ));
    }

    #[tokio::test]
    async fn secret_available_returns_the_decoded_data() {
        let cluster = FakeCluster::new();
        cluster.add_namespace("argocd").await;
        cluster
            .put_secret(
                "argocd",
                "argocd-initial-admin-secret",
                vec![("password", b"hunter2".to_vec())],
            )
            .await;
        let check = SecretAvailable::new(&cluster, "argocd", "argocd-initial-admin-secret");
        match check.evaluate().await.unwrap() {
            CheckState::Ready(data) => {
                assert_eq!(data.get("password").unwrap(), b"hunter2");
            }
            other => panic!("expected Ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn pods_ready_names_the_pods_still_waiting() {
        let cluster = FakeCluster::new();
        cluster.add_namespace("argocd").await;
        let check = PodsReady::new(&cluster, "argocd");
        // Nothing scheduled yet.
        assert!(matches!(
            check.evaluate().await.unwrap(),
            CheckState::NotReady(_)
        ));

        cluster.add_pod("argocd", ready_pod("argocd-server")).await;
        cluster
            .add_pod("argocd", pending_pod("argocd-repo-server"))
            .await;
        match check.evaluate().await.unwrap() {
            CheckState::NotReady(state) => {
                assert!(state.contains("1 of 2 pods ready"));
                assert!(state.contains("argocd-repo-server"));
            }
            other => panic!("expected NotReady, got {:?}", other),
        }

        cluster.set_pod_ready("argocd", "argocd-repo-server").await;
        match check.evaluate().await.unwrap() {
            CheckState::Ready(pods) => assert_eq!(pods.len(), 2),
            other => panic!("expected Ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn an_unreachable_cluster_is_a_hard_error() {
        let cluster = FakeCluster::new();
        cluster.fail_requests("connection refused").await;
        let check = NamespaceReady::new(&cluster, "argocd");
        let error = check.evaluate().await.unwrap_err();
        assert!(error.to_string().contains("connection refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn polling_picks_up_a_secret_created_later() {
        use gitopsys_model::wait::{poll, PollOutcome, PollPolicy};
        use std::sync::Arc;
        use std::time::Duration;

        let cluster = Arc::new(FakeCluster::new());
        cluster.add_namespace("argocd").await;

        let writer = Arc::clone(&cluster);
        tokio::spawn(async move {
            // The controller takes a while to mint the admin secret.
            tokio::time::sleep(Duration::from_secs(12)).await;
            writer
                .put_secret(
                    "argocd",
                    "argocd-initial-admin-secret",
                    vec![("password", b"hunter2".to_vec())],
                )
                .await;
        });

        let check = SecretAvailable::new(&*cluster, "argocd", "argocd-initial-admin-secret");
        let policy = PollPolicy::new(Duration::from_secs(5), Duration::from_secs(60));
        match poll(&check, &policy).await {
            PollOutcome::Ready(data) => assert_eq!(data.get("password").unwrap(), b"hunter2"),
            other => panic!("expected Ready, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn tool_installed_resolves_an_executable() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("faketool");
        std::fs::write(&tool, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let check = ToolInstalled::with_search_path("faketool", dir.path());
        match check.evaluate().await.unwrap() {
            CheckState::Ready(path) => assert_eq!(path, tool),
            other => panic!("expected Ready, got {:?}", other),
        }

        let missing = ToolInstalled::with_search_path("absent-tool", dir.path());
        let error = missing.evaluate().await.unwrap_err();
        assert!(error.to_string().contains("absent-tool"));
    }
}
