use serde::Deserialize;

/// Test settings provides a way to send arguments into the Rust tests using
/// environment variables.
pub struct TestSettings {}

impl TestSettings {
    /// The path or name of the `k3d` binary.
    pub fn k3d_path() -> &'static str {
        TEST_SETTINGS.k3d_path.as_str()
    }
}

#[derive(Debug, Deserialize)]
struct Inner {
    /// The path to the [k3d] binary. Defaults to `k3d` (i.e. by default the
    /// k3d binary is expected to be found via `$PATH`).
    ///
    /// # Example
    ///
    /// ```text
    /// GITOPSYS_SELFTEST_K3D_PATH=/wherever/k3d
    /// ```
    ///
    /// [k3d]: https://k3d.io/
    #[serde(default = "k3d")]
    k3d_path: String,
}

lazy_static::lazy_static! {
    static ref TEST_SETTINGS: Inner =
        envy::prefixed("GITOPSYS_SELFTEST_")
            .from_env::<Inner>()
            .expect("Error parsing TestSettings environment variables");
}

/// We need this to provide a default for serde.
fn k3d() -> String {
    String::from("k3d")
}
