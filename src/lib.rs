//! kadmin - administrative CLI for Kubernetes clusters

pub mod commands;
pub mod config;
pub mod edit;
pub mod k8s;
pub mod utils;
