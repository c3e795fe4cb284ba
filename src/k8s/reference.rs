//! Resource references: which cluster object a command targets

use clap::ValueEnum;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Invalid format '{input}'. Use {expected}")]
    Malformed {
        input: String,
        expected: &'static str,
    },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("Invalid replica count '{0}': must be a non-negative integer")]
    ReplicaCount(String),
}

/// Kinds of objects that can be edited in place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ResourceKind {
    #[value(alias = "deploy", alias = "deployments")]
    Deployment,

    #[value(alias = "ingress-route", alias = "ing")]
    Ingress,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "deployment",
            ResourceKind::Ingress => "ingress",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A namespaced object identified by kind, namespace and name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
}

impl ResourceRef {
    pub fn new(
        kind: ResourceKind,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ReferenceError> {
        let namespace = namespace.into();
        let name = name.into();

        if namespace.trim().is_empty() {
            return Err(ReferenceError::Empty { field: "namespace" });
        }
        if name.trim().is_empty() {
            return Err(ReferenceError::Empty { field: "name" });
        }

        Ok(Self {
            kind,
            namespace,
            name,
        })
    }

    /// Parse the `namespace/name` shorthand
    pub fn parse_slashed(kind: ResourceKind, input: &str) -> Result<Self, ReferenceError> {
        match input.split('/').collect::<Vec<_>>().as_slice() {
            [namespace, name] => Self::new(kind, *namespace, *name),
            _ => Err(ReferenceError::Malformed {
                input: input.to_string(),
                expected: "namespace/name",
            }),
        }
    }

    /// Build a reference from `<namespace> <name>` or the `<namespace/name>` shorthand
    pub fn from_args(
        kind: ResourceKind,
        first: &str,
        second: Option<&str>,
    ) -> Result<Self, ReferenceError> {
        match second {
            Some(name) => Self::new(kind, first, name),
            None => Self::parse_slashed(kind, first),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// Target of a `scale` command: `namespace:deployment:replicas`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleRequest {
    pub reference: ResourceRef,
    pub replicas: i32,
}

impl std::str::FromStr for ScaleRequest {
    type Err = ReferenceError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = input.split(':').collect();
        let [namespace, name, count] = parts.as_slice() else {
            return Err(ReferenceError::Malformed {
                input: input.to_string(),
                expected: "<namespace>:<deployment-name>:<replica-count>",
            });
        };

        let replicas = count
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|r| *r >= 0)
            .ok_or_else(|| ReferenceError::ReplicaCount(count.to_string()))?;

        Ok(Self {
            reference: ResourceRef::new(ResourceKind::Deployment, *namespace, *name)?,
            replicas,
        })
    }
}
