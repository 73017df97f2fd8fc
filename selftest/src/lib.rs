/*!

Provides utilities for testing the gitopsys system. The in-memory
[`FakeCluster`] and [`FakeProvisioner`] implement the cluster API and
cluster-manager capabilities so that readiness checks and orchestration
logic can be exercised without a cluster; the `k3d`-backed integration
tests use [`TestSettings`] to find the real binary.

!*/

mod fake;
mod test_settings;

pub use fake::{pending_pod, ready_pod, FakeCluster, FakeProvisioner};
pub use test_settings::TestSettings;
