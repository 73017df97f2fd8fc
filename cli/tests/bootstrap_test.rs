#![cfg(feature = "integ")]

use assert_cmd::Command;
use selftest::TestSettings;

/// Brings a real k3d cluster up and tears it back down. Requires docker and
/// k3d (see `TestSettings` for pointing the test at a k3d binary).
#[test]
fn bring_up_and_tear_down() {
    let cluster_name = "gitopsys-integ";

    let mut cmd = Command::cargo_bin("gitopsys").unwrap();
    cmd.args(&["preflight", "--tool", TestSettings::k3d_path()]);
    cmd.assert().success();

    let mut cmd = Command::cargo_bin("gitopsys").unwrap();
    cmd.args(&[
        "up",
        "--cluster",
        cluster_name,
        "--k3d-path",
        TestSettings::k3d_path(),
    ]);
    cmd.assert().success();

    // Running up against an existing cluster reuses it.
    let mut cmd = Command::cargo_bin("gitopsys").unwrap();
    cmd.args(&[
        "up",
        "--cluster",
        cluster_name,
        "--k3d-path",
        TestSettings::k3d_path(),
    ]);
    cmd.assert().success();

    let mut cmd = Command::cargo_bin("gitopsys").unwrap();
    cmd.args(&[
        "down",
        "--cluster",
        cluster_name,
        "--k3d-path",
        TestSettings::k3d_path(),
    ]);
    cmd.assert().success();

    // Deleting an already-deleted cluster is a no-op success.
    let mut cmd = Command::cargo_bin("gitopsys").unwrap();
    cmd.args(&[
        "down",
        "--cluster",
        cluster_name,
        "--k3d-path",
        TestSettings::k3d_path(),
    ]);
    cmd.assert().success();
}
