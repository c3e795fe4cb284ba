//! Edit a cluster object in a local text editor
//!
//! One session fetches the object, stages it as YAML in a temporary file,
//! hands that file to an editor, parses the result and replaces the object
//! on the server. Any failure ends the session; nothing is retried.

pub mod editor;
pub mod error;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use kube::Resource;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

use crate::k8s::{ResourceRef, ResourceStore, StaleResource};

pub use editor::{Editor, EditorCommand, SystemEditor};
pub use error::{EditError, EditorFailure, IoStep};
pub use session::EditSession;

/// Knobs for an edit session
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    /// Directory for the staged file; the system temp dir when unset
    pub staging_dir: Option<PathBuf>,
}

impl EditOptions {
    fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Render an object as the YAML document the user edits
///
/// `managedFields` is left out: it is server-owned bookkeeping, and the API
/// server keeps the stored value when an update omits it.
pub fn to_document<K>(object: &K) -> Result<String, serde_yaml::Error>
where
    K: Resource + Serialize + Clone,
{
    let mut object = object.clone();
    object.meta_mut().managed_fields = None;
    serde_yaml::to_string(&object)
}

/// Force namespace and name back to the reference so an edit can never move
/// or rename the object
pub fn pin_identity<K: Resource>(object: &mut K, reference: &ResourceRef) {
    let meta = object.meta_mut();
    meta.namespace = Some(reference.namespace.clone());
    meta.name = Some(reference.name.clone());
}

/// Fetch, edit, re-parse and replace the object behind `reference`
///
/// Returns the object as stored by the server after the update.
pub async fn edit_resource<K, S, E>(
    store: &S,
    editor: &E,
    reference: &ResourceRef,
    options: &EditOptions,
) -> Result<K, EditError>
where
    K: Resource + Serialize + DeserializeOwned + Clone,
    S: ResourceStore<K>,
    E: Editor + ?Sized,
{
    let current = store
        .fetch(reference)
        .await
        .map_err(|source| EditError::Fetch {
            reference: reference.clone(),
            source: source.into(),
        })?;

    let document = to_document(&current).map_err(|source| EditError::Serialize {
        reference: reference.clone(),
        source,
    })?;

    let session = EditSession::stage(reference, &document, &options.staging_dir())?;
    session.open_in(editor)?;
    let edited = session.read_back()?;

    let mut object: K = serde_yaml::from_str(&edited).map_err(|source| EditError::Deserialize {
        reference: reference.clone(),
        source,
    })?;
    pin_identity(&mut object, reference);

    crate::log_info!("Submitting edited {}", reference);

    store
        .submit(reference, &object)
        .await
        .map_err(|source| {
            if source.downcast_ref::<StaleResource>().is_some() {
                EditError::Conflict {
                    reference: reference.clone(),
                    source: source.into(),
                }
            } else {
                EditError::Submit {
                    reference: reference.clone(),
                    source: source.into(),
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::ResourceKind;
    use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ManagedFieldsEntry, ObjectMeta};

    fn deployment() -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some("web".into()),
                namespace: Some("prod".into()),
                resource_version: Some("42".into()),
                managed_fields: Some(vec![ManagedFieldsEntry {
                    manager: Some("kubectl".into()),
                    ..Default::default()
                }]),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(3),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_document_omits_managed_fields() {
        let doc = to_document(&deployment()).unwrap();
        assert!(!doc.contains("managedFields"));
        assert!(doc.contains("resourceVersion: '42'") || doc.contains("resourceVersion: \"42\""));
        assert!(doc.contains("replicas: 3"));
    }

    #[test]
    fn test_document_keeps_type_information() {
        let doc = to_document(&deployment()).unwrap();
        assert!(doc.contains("apiVersion: apps/v1"));
        assert!(doc.contains("kind: Deployment"));

        let parsed: Deployment = serde_yaml::from_str(&doc).unwrap();
        assert_eq!(parsed.metadata.name.as_deref(), Some("web"));
    }

    #[test]
    fn test_pin_identity() {
        let reference = ResourceRef::new(ResourceKind::Deployment, "prod", "web").unwrap();
        let mut moved = deployment();
        moved.metadata.namespace = Some("staging".into());
        moved.metadata.name = Some("web-copy".into());

        pin_identity(&mut moved, &reference);
        assert_eq!(moved.metadata.namespace.as_deref(), Some("prod"));
        assert_eq!(moved.metadata.name.as_deref(), Some("web"));
    }

    #[test]
    fn test_pin_identity_fills_missing_fields() {
        let reference = ResourceRef::new(ResourceKind::Deployment, "prod", "web").unwrap();
        let mut bare = Deployment::default();

        pin_identity(&mut bare, &reference);
        assert_eq!(bare.metadata.namespace.as_deref(), Some("prod"));
        assert_eq!(bare.metadata.name.as_deref(), Some("web"));
    }
}
