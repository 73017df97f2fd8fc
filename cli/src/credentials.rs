use anyhow::{Context, Result};
use clap::Parser;
use model::bootstrap::BootstrapManager;
use model::constants::DEFAULT_CONTROLLER_NAMESPACE;
use model::wait::PollPolicy;
use std::time::Duration;

/// The credentials subcommand retrieves the controller's initial admin
/// credentials, waiting for the secret if the controller is still starting.
/// The credentials are printed, never written to a file.
#[derive(Debug, Parser)]
pub(crate) struct Credentials {
    /// Namespace the controller was installed into.
    #[clap(long = "namespace", short = 'n', default_value = DEFAULT_CONTROLLER_NAMESPACE)]
    namespace: String,

    /// Seconds to wait for the initial admin secret to appear.
    #[clap(long = "wait-timeout", default_value = "60")]
    wait_timeout: u64,
}

impl Credentials {
    pub(crate) async fn run(self, client: BootstrapManager) -> Result<()> {
        let policy = PollPolicy::new(
            Duration::from_secs(5),
            Duration::from_secs(self.wait_timeout),
        );
        let credentials = client
            .admin_credentials(&self.namespace, &policy)
            .await
            .context("Unable to retrieve the admin credentials")?;

        println!("username: {}", credentials.username);
        println!("password: {}", credentials.password);
        Ok(())
    }
}
