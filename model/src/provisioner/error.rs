use snafu::Snafu;

/// The `Result` type returned by `provisioner`.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for provisioner operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unable to run '{}': {}", command, source))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display(
        "'{}' failed with exit status '{}'\n\n{}\n\n{}",
        command,
        code,
        stdout,
        stderr
    ))]
    Command {
        command: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[snafu(display("Unable to parse the cluster listing: {}", source))]
    ListParse { source: serde_json::Error },

    #[snafu(display(
        "'{}' did not print a kubeconfig path (output was '{}')",
        command,
        output
    ))]
    KubeconfigPath { command: String, output: String },

    #[snafu(display("Unable to reach the cluster manager: {}", message))]
    Unreachable { message: String },
}

impl Error {
    /// An error not backed by a failed process invocation, used by fake
    /// implementations to exercise hard-error paths.
    pub fn unreachable<S: Into<String>>(message: S) -> Self {
        Error::Unreachable {
            message: message.into(),
        }
    }
}
