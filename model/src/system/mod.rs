/// Encapsulates the K8S object definitions the bootstrap flow creates itself
/// (everything else arrives through the controller's install manifest).
mod application;
mod namespace;

pub use application::{application, application_resource, ApplicationConfig};
pub use namespace::labeled_namespace;
