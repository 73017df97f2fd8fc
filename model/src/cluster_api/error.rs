use snafu::Snafu;

/// The `Result` type returned by `cluster_api`.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for cluster API operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unable to {}: {}", action, source))]
    Kube { action: String, source: kube::Error },

    #[snafu(display("Unable to reach the cluster: {}", message))]
    Unreachable { message: String },
}

impl Error {
    /// An error not backed by a `kube::Error`, used by fake implementations
    /// to exercise hard-error paths.
    pub fn unreachable<S: Into<String>>(message: S) -> Self {
        Error::Unreachable {
            message: message.into(),
        }
    }
}
