use snafu::Snafu;
use std::path::PathBuf;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for `BootstrapManager`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum Error {
    #[snafu(display("Unable to {}: {}", action, source))]
    Api {
        action: String,
        source: crate::cluster_api::Error,
    },

    #[snafu(display("The check '{}' failed: {}", check, source))]
    Check {
        check: String,
        source: crate::wait::CheckError,
    },

    #[snafu(display("Unable to create client: {}", source))]
    ClientCreate { source: kube::Error },

    #[snafu(display("Unable to read kubeconfig: {}", source))]
    ConfigRead {
        source: kube::config::KubeconfigError,
    },

    #[snafu(display("Unable to create client from kubeconfig: {}", source))]
    ClientCreateKubeconfig {
        source: kube::config::KubeconfigError,
    },

    #[snafu(display(
        "Unable to resolve kind '{}' on the api server: {}",
        kind,
        source
    ))]
    Discovery { kind: String, source: kube::Error },

    #[snafu(display("Unable to read file '{}': {}", path.display(), source))]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to {}: {}", action, source))]
    Kube { action: String, source: kube::Error },

    #[snafu(display("Manifest document is missing {}", what))]
    ManifestIncomplete { what: String },

    #[snafu(display("Unable to parse manifest: {}", source))]
    ManifestParse { source: serde_yaml::Error },

    #[snafu(display("The secret '{}' has no '{}' entry", secret, key))]
    MissingSecretKey { secret: String, key: String },

    #[snafu(display(
        "The '{}' entry of secret '{}' is not valid UTF-8: {}",
        key,
        secret,
        source
    ))]
    SecretUtf8 {
        key: String,
        secret: String,
        source: std::string::FromUtf8Error,
    },

    #[snafu(display(
        "Gave up waiting for {} after {:?}; last observed state: {}",
        what,
        waited,
        last
    ))]
    WaitTimeout {
        what: String,
        waited: Duration,
        last: String,
    },
}
