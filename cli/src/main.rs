/*!

This is the command line interface for standing up a local GitOps lab: a k3d
cluster with a GitOps controller installed and pointed at a manifest
repository.

!*/

mod app;
mod credentials;
mod down;
mod install;
mod preflight;
mod status;
mod up;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use model::bootstrap::BootstrapManager;
use std::path::PathBuf;

/// The command line interface for standing up a local GitOps lab cluster.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// Path to the kubeconfig file. Also can be passed with the KUBECONFIG environment variable.
    #[clap(long = "kubeconfig")]
    kubeconfig: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Check that the required tools are installed.
    Preflight(preflight::Preflight),
    /// Create the lab cluster and its namespaces.
    Up(up::Up),
    /// Install the GitOps controller into the cluster.
    Install(install::Install),
    /// Point the GitOps controller at a manifest repository.
    App(app::App),
    /// Retrieve the controller's initial admin credentials.
    Credentials(credentials::Credentials),
    /// Show the pods of the lab namespaces.
    Status(status::Status),
    /// Delete the lab cluster.
    Down(down::Down),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.log_level);
    if let Err(e) = run(args).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Preflight(preflight) => preflight.run().await,
        Command::Up(up) => up.run().await,
        Command::Install(install) => install.run(manager(&args.kubeconfig).await?).await,
        Command::App(app) => app.run(manager(&args.kubeconfig).await?).await,
        Command::Credentials(credentials) => {
            credentials.run(manager(&args.kubeconfig).await?).await
        }
        Command::Status(status) => status.run(manager(&args.kubeconfig).await?).await,
        Command::Down(down) => down.run(&args.kubeconfig).await,
    }
}

/// Create the client the cluster-facing subcommands share. `preflight`, `up`
/// and `down` construct no client here since the cluster may not exist yet.
async fn manager(kubeconfig: &Option<PathBuf>) -> Result<BootstrapManager> {
    match kubeconfig {
        Some(path) => BootstrapManager::new_from_kubeconfig_path(path)
            .await
            .context(format!(
                "Unable to create client from kubeconfig at '{}'",
                path.display()
            )),
        None => BootstrapManager::new()
            .await
            .context("Unable to create default client"),
    }
}

/// Initialize the logger with the value passed by `--log-level` (or its default) when the
/// `RUST_LOG` environment variable is not present. If present, the `RUST_LOG` environment variable
/// overrides `--log-level`/`level`.
fn init_logger(level: LevelFilter) {
    match std::env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; set default log levels for the lab components.
            Builder::new()
                .filter(Some(env!("CARGO_CRATE_NAME")), level)
                .filter(Some("gitopsys_model"), level)
                .init();
        }
    }
}
