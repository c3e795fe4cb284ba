//! Kubernetes operations

pub mod client;
pub mod reference;
pub mod store;

pub use client::{ClusterOptions, connect};
pub use reference::{ReferenceError, ResourceKind, ResourceRef, ScaleRequest};
pub use store::{KubeStore, ResourceStore, StaleResource};
