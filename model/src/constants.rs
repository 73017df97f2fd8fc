// System identifiers
pub const MANAGED_BY: &str = "gitopsys";

// Defaults for the local lab cluster
pub const DEFAULT_CLUSTER_NAME: &str = "gitopsys";
pub const DEFAULT_K3D_PROGRAM: &str = "k3d";

// The GitOps controller (Argo CD) and the objects it owns
pub const DEFAULT_CONTROLLER_NAMESPACE: &str = "argocd";
pub const ADMIN_SECRET_NAME: &str = "argocd-initial-admin-secret";
pub const ADMIN_USERNAME: &str = "admin";
pub const SECRET_PASSWORD_KEY: &str = "password";
pub const APPLICATION_GROUP: &str = "argoproj.io";
pub const APPLICATION_VERSION: &str = "v1alpha1";
pub const APPLICATION_KIND: &str = "Application";

// Label keys
pub const APP_MANAGED_BY: &str = "app.kubernetes.io/managed-by";
