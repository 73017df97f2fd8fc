/*!

# Bootstrap Manager

The bootstrap manager provides the orchestration operations that stand a
GitOps lab up on a running cluster: creating namespaces, installing the
GitOps controller from its install manifest, pointing it at a manifest
repository, retrieving the initial admin credentials, and tearing the
namespaces back down. Each operation corresponds to one step of the original
bring-up flow, with every wait going through the bounded poller in
[`crate::wait`].

Cluster *lifecycle* (create/delete) is not handled here; that belongs to
[`crate::provisioner`], which hands back the [`crate::provisioner::ClusterHandle`]
a manager is constructed from.

!*/

mod error;
mod install;
mod manager;
mod status;

pub use error::{Error, Result};
pub use install::{parse_manifest, read_manifest};
pub use manager::BootstrapManager;
pub use status::{NamespaceStatus, StatusSnapshot};

use crate::cluster_api::SecretData;
use crate::constants::{ADMIN_SECRET_NAME, ADMIN_USERNAME, SECRET_PASSWORD_KEY};
use serde::Serialize;
use snafu::{OptionExt, ResultExt};

/// The initial admin credentials of the GitOps controller, returned as a
/// value for the caller to use or display. Nothing here writes them to disk.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Extract the admin credentials from the initial admin secret's data.
    pub(super) fn from_secret_data(data: &SecretData) -> Result<Self> {
        let password = data
            .get(SECRET_PASSWORD_KEY)
            .context(error::MissingSecretKeySnafu {
                secret: ADMIN_SECRET_NAME,
                key: SECRET_PASSWORD_KEY,
            })?;
        let password =
            String::from_utf8(password.clone()).context(error::SecretUtf8Snafu {
                secret: ADMIN_SECRET_NAME,
                key: SECRET_PASSWORD_KEY,
            })?;
        Ok(Self {
            username: ADMIN_USERNAME.to_string(),
            password,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn credentials_come_from_the_password_entry() {
        let mut data = BTreeMap::new();
        data.insert("password".to_string(), b"s3cret".to_vec());
        let credentials = Credentials::from_secret_data(&data).unwrap();
        assert_eq!(credentials.username, "admin");
        assert_eq!(credentials.password, "s3cret");
    }

    #[test]
    fn a_secret_without_a_password_entry_is_an_error() {
        let data = BTreeMap::new();
        let error = Credentials::from_secret_data(&data).unwrap_err();
        assert!(error.to_string().contains("password"));
    }
}
