use crate::constants::{APP_MANAGED_BY, MANAGED_BY};
use k8s_openapi::api::core::v1::Namespace;
use kube::api::ObjectMeta;
use maplit::btreemap;

/// Defines a namespace labeled as managed by gitopsys, so that teardown can
/// tell its namespaces apart from everything else in the cluster.
pub fn labeled_namespace(name: &str) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(btreemap! {
                APP_MANAGED_BY.to_string() => MANAGED_BY.to_string()
            }),
            ..Default::default()
        },
        ..Default::default()
    }
}
