//! Fetch/submit access to namespaced objects

use anyhow::{Context, Result};
use kube::api::{Api, PostParams};
use kube::{Client, Resource};
use k8s_openapi::NamespaceResourceScope;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;

use super::reference::ResourceRef;

/// The update was rejected because the object changed after it was fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleResource {
    pub reference: ResourceRef,
}

impl std::fmt::Display for StaleResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} was modified by someone else after it was fetched",
            self.reference
        )
    }
}

/// Read and replace a single object by reference
///
/// Implementations report a stale `resourceVersion` on submit as an error
/// carrying [`StaleResource`], so callers can tell conflicts apart from other
/// rejections.
pub trait ResourceStore<K> {
    /// Get the current state of the object
    fn fetch(&self, reference: &ResourceRef) -> impl Future<Output = Result<K>>;

    /// Replace the object with `object`, returning what the server stored
    fn submit(&self, reference: &ResourceRef, object: &K) -> impl Future<Output = Result<K>>;
}

/// [`ResourceStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    dry_run: bool,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            dry_run: false,
        }
    }

    /// Submit with server-side dry run: validated by the API server, never persisted
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn api<K>(&self, reference: &ResourceRef) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), &reference.namespace)
    }
}

impl<K> ResourceStore<K> for KubeStore
where
    K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Serialize + Debug,
    <K as Resource>::DynamicType: Default,
{
    async fn fetch(&self, reference: &ResourceRef) -> Result<K> {
        tracing::debug!(%reference, "fetching");
        self.api::<K>(reference)
            .get(&reference.name)
            .await
            .with_context(|| format!("Failed to get {}", reference))
    }

    async fn submit(&self, reference: &ResourceRef, object: &K) -> Result<K> {
        tracing::debug!(%reference, dry_run = self.dry_run, "replacing");
        let params = PostParams {
            dry_run: self.dry_run,
            ..Default::default()
        };

        self.api::<K>(reference)
            .replace(&reference.name, &params, object)
            .await
            .map_err(|err| submit_error(reference, err))
    }
}

/// A 409 from a replace means our `resourceVersion` is stale; tag it with
/// [`StaleResource`] so it can be told apart from other rejections
fn submit_error(reference: &ResourceRef, err: kube::Error) -> anyhow::Error {
    match err {
        kube::Error::Api(ref status) if status.code == 409 => {
            anyhow::anyhow!("{}", status.message).context(StaleResource {
                reference: reference.clone(),
            })
        }
        err => anyhow::Error::new(err).context(format!("Failed to update {}", reference)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::ResourceKind;
    use kube::core::ErrorResponse;

    fn web() -> ResourceRef {
        ResourceRef::new(ResourceKind::Deployment, "prod", "web").unwrap()
    }

    fn api_error(code: u16, reason: &str, message: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".into(),
            message: message.into(),
            reason: reason.into(),
            code,
        })
    }

    #[test]
    fn test_conflict_is_marked_stale() {
        let err = submit_error(
            &web(),
            api_error(409, "Conflict", "the object has been modified; please apply your changes to the latest version"),
        );

        let stale = err.downcast_ref::<StaleResource>().unwrap();
        assert_eq!(stale.reference, web());
        assert!(format!("{:#}", err).contains("the object has been modified"));
    }

    #[test]
    fn test_other_rejections_are_not_stale() {
        let err = submit_error(
            &web(),
            api_error(422, "Invalid", "spec.replicas: Invalid value: -1"),
        );

        assert!(err.downcast_ref::<StaleResource>().is_none());
        assert_eq!(err.to_string(), "Failed to update deployment prod/web");
        assert!(format!("{:#}", err).contains("spec.replicas: Invalid value"));
    }
}
