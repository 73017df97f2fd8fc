use super::error::{self, Result};
use super::{ClusterHandle, Provisioner};
use crate::constants::DEFAULT_K3D_PROGRAM;
use log::{info, trace};
use serde::Deserialize;
use snafu::{ensure, ResultExt};
use std::process::Output;
use tokio::process::Command;

/// A [`Provisioner`] backed by the [k3d] CLI.
///
/// [k3d]: https://k3d.io/
#[derive(Debug, Clone)]
pub struct K3d {
    program: String,
}

impl Default for K3d {
    fn default() -> Self {
        Self::new(DEFAULT_K3D_PROGRAM)
    }
}

/// One entry of `k3d cluster list --output json`. Only the name matters here.
#[derive(Debug, Deserialize)]
struct ClusterListEntry {
    name: String,
}

impl K3d {
    /// `program` is the path or name of the `k3d` binary.
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Ask k3d where the kubeconfig for `name` lives, writing it if needed.
    /// This is how a handle to an already-running cluster is recovered.
    pub async fn write_kubeconfig(&self, name: &str) -> Result<ClusterHandle> {
        let (command, output) = self.run(&["kubeconfig", "write", name]).await?;
        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        ensure!(
            !path.is_empty(),
            error::KubeconfigPathSnafu {
                command,
                output: path
            }
        );
        Ok(ClusterHandle::new(name, path))
    }

    async fn run(&self, args: &[&str]) -> Result<(String, Output)> {
        let command = format!("{} {}", self.program, args.join(" "));
        trace!("running '{}'", command);
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .await
            .context(error::SpawnSnafu {
                command: command.as_str(),
            })?;
        ensure!(
            output.status.success(),
            error::CommandSnafu {
                command: command.as_str(),
                code: output.status.code().unwrap_or(1),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }
        );
        Ok((command, output))
    }
}

#[async_trait::async_trait]
impl Provisioner for K3d {
    async fn create_cluster(&self, name: &str) -> Result<ClusterHandle> {
        self.run(&["cluster", "create", name]).await?;
        self.write_kubeconfig(name).await
    }

    async fn delete_cluster(&self, name: &str) -> Result<()> {
        if !self.cluster_exists(name).await? {
            info!("cluster '{}' does not exist, nothing to delete", name);
            return Ok(());
        }
        self.run(&["cluster", "delete", name]).await?;
        Ok(())
    }

    async fn list_clusters(&self) -> Result<Vec<String>> {
        let (_, output) = self.run(&["cluster", "list", "--output", "json"]).await?;
        let entries: Vec<ClusterListEntry> =
            serde_json::from_slice(&output.stdout).context(error::ListParseSnafu)?;
        Ok(entries.into_iter().map(|entry| entry.name).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cluster_list_output_parses() {
        let raw = r#"[
            {"name":"gitopsys","serversCount":1,"serversRunning":1,"agentsCount":0},
            {"name":"other-lab","serversCount":1,"serversRunning":1,"agentsCount":2}
        ]"#;
        let entries: Vec<ClusterListEntry> = serde_json::from_str(raw).unwrap();
        let names: Vec<String> = entries.into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["gitopsys", "other-lab"]);
    }
}
