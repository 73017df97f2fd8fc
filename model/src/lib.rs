/*!

This library provides the building blocks for standing up and tearing down a
local GitOps lab: a bounded readiness poller, the readiness checks used
during bring-up, a cluster provisioner capability backed by `k3d`, a cluster
API capability backed by `kube`, and the bootstrap manager that sequences the
orchestration steps.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use bootstrap::{BootstrapManager, Credentials, StatusSnapshot};
pub use cluster_api::{ClusterApi, KubeClusterApi, PodSummary, SecretData};
pub use provisioner::{ClusterHandle, K3d, Provisioner};
pub use system::ApplicationConfig;
pub use wait::{
    poll, Check, CheckError, CheckState, ErrorDisposition, PollOutcome, PollPolicy,
};

pub mod bootstrap;
pub mod checks;
pub mod cluster_api;
pub mod constants;
pub mod provisioner;
pub mod system;
pub mod wait;
