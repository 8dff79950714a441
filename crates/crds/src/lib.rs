//! Node class CRD definitions
//!
//! Kubernetes Custom Resource Definitions consumed by the node image resolver.

pub mod aks_node_class;

pub use aks_node_class::*;
