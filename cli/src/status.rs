use anyhow::{Context, Result};
use clap::Parser;
use model::bootstrap::BootstrapManager;
use model::constants::DEFAULT_CONTROLLER_NAMESPACE;
use terminal_size::{Height, Width};

/// Check the pods of the lab namespaces.
#[derive(Debug, Parser)]
pub(crate) struct Status {
    /// Output the results in JSON format.
    #[clap(long = "json")]
    json: bool,

    /// A namespace to include. May be repeated.
    #[clap(long = "namespace", short = 'n', default_values = &[DEFAULT_CONTROLLER_NAMESPACE])]
    namespaces: Vec<String>,
}

impl Status {
    pub(crate) async fn run(self, client: BootstrapManager) -> Result<()> {
        let status = client
            .status(&self.namespaces)
            .await
            .context("Unable to get status")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&status)
                    .context("Could not create string from status.")?
            );
        } else if status.is_empty() {
            println!("no pods found in: {}", self.namespaces.join(", "));
        } else {
            let (Width(width), _) =
                terminal_size::terminal_size().unwrap_or((Width(120), Height(0)));
            println!("{}", status.to_string(width as usize));
        }
        Ok(())
    }
}
