use crate::cluster_api::PodSummary;
use serde::Serialize;
use tabled::{object::Full, Alignment, MaxWidth, MinWidth, Modify, Style, Table, Tabled};

/// `StatusSnapshot` represents the pods of the namespaces the bootstrap flow
/// cares about, at one point in time. `to_string()` renders it as a table;
/// with `serde_json` it renders as JSON.
#[derive(Debug, Serialize)]
pub struct StatusSnapshot {
    namespaces: Vec<NamespaceStatus>,
}

/// The pods of one namespace.
#[derive(Debug, Serialize)]
pub struct NamespaceStatus {
    pub name: String,
    pub pods: Vec<PodSummary>,
}

impl StatusSnapshot {
    pub(super) fn new(namespaces: Vec<NamespaceStatus>) -> Self {
        Self { namespaces }
    }

    /// Create a table containing a row per pod, truncated to `width`.
    pub fn to_string(&self, width: usize) -> String {
        let table: Table = self.into();
        table
            .with(MaxWidth::truncating(width))
            .with(MinWidth::new(width))
            .to_string()
    }

    /// Whether any of the namespaces contain pods at all.
    pub fn is_empty(&self) -> bool {
        self.namespaces.iter().all(|ns| ns.pods.is_empty())
    }
}

impl From<&StatusSnapshot> for Table {
    fn from(snapshot: &StatusSnapshot) -> Self {
        let mut rows = Vec::new();
        for namespace in &snapshot.namespaces {
            for pod in &namespace.pods {
                rows.push(ResultRow {
                    namespace: namespace.name.clone(),
                    name: pod.name.clone(),
                    ready: format!("{}/{}", pod.ready_containers, pod.total_containers),
                    phase: pod.phase.clone(),
                });
            }
        }
        rows.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));

        Table::new(rows)
            .with(Style::blank())
            .with(Modify::new(Full).with(Alignment::left()))
    }
}

#[derive(Tabled, Default, Clone)]
struct ResultRow {
    #[tabled(rename = "NAMESPACE")]
    namespace: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "READY")]
    ready: String,
    #[tabled(rename = "PHASE")]
    phase: String,
}

#[cfg(test)]
mod test {
    use super::*;

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot::new(vec![NamespaceStatus {
            name: "argocd".to_string(),
            pods: vec![
                PodSummary {
                    name: "argocd-server-0".to_string(),
                    phase: "Running".to_string(),
                    ready_containers: 1,
                    total_containers: 1,
                    is_ready: true,
                },
                PodSummary {
                    name: "argocd-repo-server-0".to_string(),
                    phase: "Pending".to_string(),
                    ready_containers: 0,
                    total_containers: 1,
                    is_ready: false,
                },
            ],
        }])
    }

    #[test]
    fn table_contains_a_row_per_pod() {
        let rendered = snapshot().to_string(120);
        assert!(rendered.contains("argocd-server-0"));
        assert!(rendered.contains("argocd-repo-server-0"));
        assert!(rendered.contains("1/1"));
        assert!(rendered.contains("Pending"));
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let json = serde_json::to_value(&snapshot()).unwrap();
        assert_eq!(
            json.pointer("/namespaces/0/pods/0/name").unwrap(),
            "argocd-server-0"
        );
    }
}
