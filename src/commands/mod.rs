//! Command implementations for the kadmin CLI

pub mod cleanup;
pub mod deployments;
pub mod edit;
pub mod events;
pub mod logs;
pub mod pods;
pub mod secrets;
