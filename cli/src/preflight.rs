use anyhow::{anyhow, Result};
use clap::Parser;
use model::checks::ToolInstalled;
use model::wait::{poll, PollOutcome, PollPolicy};

/// The preflight subcommand checks that the tools the lab shells out to are
/// actually installed. A missing tool is fatal; nothing later can succeed
/// without it.
#[derive(Debug, Parser)]
pub(crate) struct Preflight {
    /// A tool that must resolve on the PATH. May be repeated.
    #[clap(long = "tool", default_values = &["k3d"])]
    tools: Vec<String>,
}

impl Preflight {
    pub(crate) async fn run(self) -> Result<()> {
        for tool in &self.tools {
            let check = ToolInstalled::new(tool);
            match poll(&check, &PollPolicy::once()).await {
                PollOutcome::Ready(path) => println!("{}: {}", tool, path.display()),
                PollOutcome::Failed { source, .. } => return Err(anyhow!(source)),
                PollOutcome::TimedOut { last, .. } => return Err(anyhow!("{}", last)),
            }
        }
        println!("all required tools are installed.");
        Ok(())
    }
}
