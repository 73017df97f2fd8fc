use crate::constants::{
    APPLICATION_GROUP, APPLICATION_KIND, APPLICATION_VERSION, APP_MANAGED_BY, MANAGED_BY,
};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use maplit::btreemap;
use serde_json::json;

/// Where a GitOps `Application` pulls its manifests from and where it
/// deploys them.
#[derive(Debug, Clone)]
pub struct ApplicationConfig {
    /// Name of the `Application` object.
    pub name: String,
    /// Namespace the controller watches for `Application` objects.
    pub namespace: String,
    /// Git repository holding the manifests.
    pub repo_url: String,
    /// Path within the repository.
    pub path: String,
    /// Branch, tag or commit to track.
    pub target_revision: String,
    /// Namespace the manifests are deployed into.
    pub destination_namespace: String,
    /// Whether the controller reconciles continuously without manual syncs.
    pub automated_sync: bool,
}

/// The API resource for the controller's `Application` kind. The kind lives
/// in a CRD, so its plural follows the usual lowercase-plus-s convention and
/// no server-side discovery is required.
pub fn application_resource() -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind::gvk(
        APPLICATION_GROUP,
        APPLICATION_VERSION,
        APPLICATION_KIND,
    ))
}

/// Defines the `Application` object pointing the GitOps controller at a
/// manifest repository. This is the one static manifest the original flow
/// applied once.
pub fn application(config: &ApplicationConfig) -> DynamicObject {
    let mut object = DynamicObject::new(&config.name, &application_resource())
        .within(&config.namespace);
    object.metadata.labels = Some(btreemap! {
        APP_MANAGED_BY.to_string() => MANAGED_BY.to_string()
    });
    let mut spec = json!({
        "project": "default",
        "source": {
            "repoURL": config.repo_url,
            "path": config.path,
            "targetRevision": config.target_revision,
        },
        "destination": {
            "server": "https://kubernetes.default.svc",
            "namespace": config.destination_namespace,
        },
        "syncPolicy": {
            "syncOptions": ["CreateNamespace=true"],
        },
    });
    if config.automated_sync {
        spec["syncPolicy"]["automated"] = json!({
            "prune": true,
            "selfHeal": true,
        });
    }
    object.data = json!({ "spec": spec });
    object
}

#[cfg(test)]
mod test {
    use super::*;

    fn config() -> ApplicationConfig {
        ApplicationConfig {
            name: "demo".to_string(),
            namespace: "argocd".to_string(),
            repo_url: "https://github.com/example/manifests.git".to_string(),
            path: "overlays/dev".to_string(),
            target_revision: "main".to_string(),
            destination_namespace: "demo".to_string(),
            automated_sync: true,
        }
    }

    #[test]
    fn application_points_at_the_manifest_repository() {
        let object = application(&config());
        assert_eq!(object.metadata.name.as_deref(), Some("demo"));
        assert_eq!(object.metadata.namespace.as_deref(), Some("argocd"));
        assert_eq!(
            object.data.pointer("/spec/source/repoURL").unwrap(),
            "https://github.com/example/manifests.git"
        );
        assert_eq!(
            object.data.pointer("/spec/destination/namespace").unwrap(),
            "demo"
        );
        assert_eq!(
            object
                .data
                .pointer("/spec/syncPolicy/automated/prune")
                .unwrap(),
            true
        );
    }

    #[test]
    fn manual_sync_omits_the_automated_policy() {
        let mut config = config();
        config.automated_sync = false;
        let object = application(&config);
        assert!(object.data.pointer("/spec/syncPolicy/automated").is_none());
    }
}
