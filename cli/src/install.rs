use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use model::bootstrap::BootstrapManager;
use model::constants::DEFAULT_CONTROLLER_NAMESPACE;
use model::wait::{PollOutcome, PollPolicy};
use std::path::PathBuf;
use std::time::Duration;
use terminal_size::{Height, Width};

/// The install subcommand is responsible for putting the GitOps controller
/// into the cluster from its install manifest and waiting (bounded) for its
/// pods. Pods not becoming ready in time is advisory, not fatal: the status
/// is shown and the controller keeps starting in the background.
#[derive(Debug, Parser)]
pub(crate) struct Install {
    /// Namespace to install the controller into.
    #[clap(long = "namespace", short = 'n', default_value = DEFAULT_CONTROLLER_NAMESPACE)]
    namespace: String,

    /// Path to the controller's install manifest (multi-document yaml).
    #[clap(long = "manifest")]
    manifest: PathBuf,

    /// Seconds to wait for the controller pods to report ready.
    #[clap(long = "wait-timeout", default_value = "120")]
    wait_timeout: u64,

    /// Seconds between readiness checks.
    #[clap(long = "poll-interval", default_value = "5")]
    poll_interval: u64,
}

impl Install {
    pub(crate) async fn run(self, client: BootstrapManager) -> Result<()> {
        client
            .install_controller(&self.namespace, &self.manifest)
            .await
            .context("Unable to install the GitOps controller")?;

        let policy = PollPolicy::new(
            Duration::from_secs(self.poll_interval),
            Duration::from_secs(self.wait_timeout),
        );
        match client.wait_for_pods(&self.namespace, &policy).await {
            PollOutcome::Ready(pods) => {
                println!(
                    "the GitOps controller was successfully installed ({} pods ready).",
                    pods.len()
                );
            }
            PollOutcome::TimedOut { last, waited, .. } => {
                warn!(
                    "controller pods were not all ready after {:?}: {}",
                    waited, last
                );
                let status = client
                    .status(&[self.namespace.clone()])
                    .await
                    .context("Unable to get status")?;
                let (Width(width), _) =
                    terminal_size::terminal_size().unwrap_or((Width(120), Height(0)));
                println!("{}", status.to_string(width as usize));
                println!("the controller is still starting; check again with 'gitopsys status'.");
            }
            PollOutcome::Failed { source, .. } => {
                return Err(
                    anyhow::Error::new(source).context("Unable to watch the controller pods")
                );
            }
        }
        Ok(())
    }
}
