use anyhow::{Context, Result};
use clap::Parser;
use model::bootstrap::BootstrapManager;
use model::constants::DEFAULT_CONTROLLER_NAMESPACE;
use model::system::ApplicationConfig;

/// The app subcommand points the GitOps controller at a manifest repository.
/// From then on the controller owns reconciliation; this is applied once.
#[derive(Debug, Parser)]
pub(crate) struct App {
    /// Name of the Application object.
    #[clap(long = "name", default_value = "lab-app")]
    name: String,

    /// Namespace the controller watches for Application objects.
    #[clap(long = "namespace", short = 'n', default_value = DEFAULT_CONTROLLER_NAMESPACE)]
    namespace: String,

    /// Git repository holding the manifests.
    #[clap(long = "repo-url")]
    repo_url: String,

    /// Path within the repository.
    #[clap(long = "path", default_value = ".")]
    path: String,

    /// Branch, tag or commit to track.
    #[clap(long = "revision", default_value = "main")]
    revision: String,

    /// Namespace the manifests are deployed into.
    #[clap(long = "dest-namespace")]
    dest_namespace: String,

    /// Require manual syncs instead of automated reconciliation.
    #[clap(long = "no-auto-sync")]
    no_auto_sync: bool,
}

impl App {
    pub(crate) async fn run(self, client: BootstrapManager) -> Result<()> {
        let config = ApplicationConfig {
            name: self.name.clone(),
            namespace: self.namespace,
            repo_url: self.repo_url.clone(),
            path: self.path,
            target_revision: self.revision,
            destination_namespace: self.dest_namespace,
            automated_sync: !self.no_auto_sync,
        };
        client
            .wire_application(&config)
            .await
            .context("Unable to create the application")?;

        println!(
            "application '{}' now tracks '{}'.",
            self.name, self.repo_url
        );
        Ok(())
    }
}
