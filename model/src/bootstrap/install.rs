use super::{error, BootstrapManager, Result};
use crate::system::{application, application_resource, ApplicationConfig};
use kube::api::{Patch, PatchParams, PostParams};
use kube::core::{DynamicObject, GroupVersionKind, TypeMeta};
use kube::discovery::{oneshot, Scope};
use kube::{Api, ResourceExt};
use log::{debug, info};
use serde::Deserialize;
use snafu::{OptionExt, ResultExt};
use std::path::Path;

impl BootstrapManager {
    /// Install the GitOps controller into `namespace` from its install
    /// manifest: every document in the manifest is created, or patched if it
    /// already exists. Namespaced documents that do not name a namespace land
    /// in `namespace`, the way `kubectl apply -n` would place them.
    pub async fn install_controller(&self, namespace: &str, manifest_path: &Path) -> Result<()> {
        self.create_namespace(namespace).await?;
        let objects = read_manifest(manifest_path)?;
        info!(
            "applying {} objects from '{}'",
            objects.len(),
            manifest_path.display()
        );
        for object in objects {
            self.apply_object(namespace, object).await?;
        }
        Ok(())
    }

    /// Point the GitOps controller at a manifest repository by applying an
    /// `Application` object. Applied once; from then on the controller owns
    /// reconciliation.
    pub async fn wire_application(&self, config: &ApplicationConfig) -> Result<()> {
        let object = application(config);
        let api: Api<DynamicObject> = Api::namespaced_with(
            self.k8s_client.clone(),
            &config.namespace,
            &application_resource(),
        );
        self.create_or_update(&api, &object, "Application").await?;
        info!(
            "application '{}' now tracks '{}' at revision '{}'",
            config.name, config.repo_url, config.target_revision
        );
        Ok(())
    }

    /// Apply one manifest document, resolving its API resource and scope
    /// through server-side discovery.
    async fn apply_object(&self, default_namespace: &str, object: DynamicObject) -> Result<()> {
        let types = object
            .types
            .as_ref()
            .context(error::ManifestIncompleteSnafu {
                what: "an apiVersion and kind",
            })?;
        let gvk = gvk_of(types);
        snafu::ensure!(
            object.metadata.name.is_some(),
            error::ManifestIncompleteSnafu {
                what: "a metadata.name"
            }
        );

        let (resource, capabilities) = oneshot::pinned_kind(&self.k8s_client, &gvk)
            .await
            .context(error::DiscoverySnafu {
                kind: gvk.kind.clone(),
            })?;
        let api: Api<DynamicObject> = if matches!(capabilities.scope, Scope::Namespaced) {
            let namespace = object
                .metadata
                .namespace
                .as_deref()
                .unwrap_or(default_namespace);
            Api::namespaced_with(self.k8s_client.clone(), namespace, &resource)
        } else {
            Api::all_with(self.k8s_client.clone(), &resource)
        };
        self.create_or_update(&api, &object, &gvk.kind).await
    }

    /// Create the object, or patch it with a merge if it is already there.
    async fn create_or_update(
        &self,
        api: &Api<DynamicObject>,
        object: &DynamicObject,
        what: &str,
    ) -> Result<()> {
        let name = object.name_any();
        debug!("applying {} '{}'", what, name);
        match api.get(&name).await {
            Ok(_) => {
                api.patch(&name, &PatchParams::default(), &Patch::Merge(object))
                    .await
            }
            Err(_err) => api.create(&PostParams::default(), object).await,
        }
        .context(error::KubeSnafu {
            action: format!("apply {} '{}'", what, name),
        })?;
        Ok(())
    }
}

/// Takes a path to a multi-document yaml manifest and parses each document
/// into a `DynamicObject` ready to be applied.
pub fn read_manifest(path: &Path) -> Result<Vec<DynamicObject>> {
    let manifest = std::fs::read_to_string(path).context(error::FileSnafu { path })?;
    parse_manifest(&manifest)
}

/// Takes a `String` containing a multi-document yaml manifest and parses
/// each document into a `DynamicObject`. Empty documents are skipped.
pub fn parse_manifest(manifest: &str) -> Result<Vec<DynamicObject>> {
    let mut objects = Vec::new();
    for document in serde_yaml::Deserializer::from_str(manifest) {
        let value = serde_yaml::Value::deserialize(document).context(error::ManifestParseSnafu)?;
        if value.is_null() {
            continue;
        }
        let object: DynamicObject =
            serde_yaml::from_value(value).context(error::ManifestParseSnafu)?;
        objects.push(object);
    }
    Ok(objects)
}

/// Split a document's `apiVersion`/`kind` into a `GroupVersionKind`. An
/// `apiVersion` without a slash is the core group.
fn gvk_of(types: &TypeMeta) -> GroupVersionKind {
    let (group, version) = match types.api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", types.api_version.as_str()),
    };
    GroupVersionKind::gvk(group, version, &types.kind)
}

#[cfg(test)]
mod test {
    use super::*;

    const MANIFEST: &str = r#"
apiVersion: v1
kind: ServiceAccount
metadata:
  name: argocd-server
---
# A comment-only document parses to null and is skipped.
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: argocd-repo-server
  labels:
    app.kubernetes.io/part-of: argocd
spec:
  replicas: 1
"#;

    #[test]
    fn multi_document_manifests_parse_and_skip_empty_documents() {
        let objects = parse_manifest(MANIFEST).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name_any(), "argocd-server");
        assert_eq!(objects[1].name_any(), "argocd-repo-server");
        assert_eq!(
            objects[1].types.as_ref().unwrap().kind.as_str(),
            "Deployment"
        );
        assert_eq!(
            objects[1].data.pointer("/spec/replicas").unwrap(),
            &serde_json::json!(1)
        );
    }

    #[test]
    fn api_versions_split_into_group_and_version() {
        let core = TypeMeta {
            api_version: "v1".to_string(),
            kind: "ServiceAccount".to_string(),
        };
        let gvk = gvk_of(&core);
        assert_eq!(gvk.group, "");
        assert_eq!(gvk.version, "v1");

        let grouped = TypeMeta {
            api_version: "argoproj.io/v1alpha1".to_string(),
            kind: "Application".to_string(),
        };
        let gvk = gvk_of(&grouped);
        assert_eq!(gvk.group, "argoproj.io");
        assert_eq!(gvk.version, "v1alpha1");
        assert_eq!(gvk.kind, "Application");
    }

    #[test]
    fn garbage_manifests_are_an_error() {
        assert!(parse_manifest("a: [unclosed").is_err());
    }
}
