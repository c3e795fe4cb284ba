//! `kadmin edit`: open a deployment or ingress in the user's editor

use anyhow::Result;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::networking::v1::Ingress;
use kube::{Client, ResourceExt};
use std::path::PathBuf;

use crate::config::Settings;
use crate::edit::{EditOptions, EditorCommand, edit_resource};
use crate::k8s::{KubeStore, ResourceKind, ResourceRef};
use crate::utils::dryrun;

pub async fn edit(client: &Client, settings: &Settings, reference: &ResourceRef) -> Result<()> {
    let editor = EditorCommand::from_env(settings.editor.command.as_deref());
    let store = KubeStore::new(client.clone()).with_dry_run(dryrun::is_dry_run());
    let options = EditOptions {
        staging_dir: settings.editor.staging_dir.as_ref().map(PathBuf::from),
    };

    dryrun::log_action(&format!(
        "{} will be validated by the API server but not persisted",
        reference
    ));

    let version = match reference.kind {
        ResourceKind::Deployment => {
            edit_resource::<Deployment, _, _>(&store, &editor, reference, &options)
                .await?
                .resource_version()
        }
        ResourceKind::Ingress => {
            edit_resource::<Ingress, _, _>(&store, &editor, reference, &options)
                .await?
                .resource_version()
        }
    };

    println!(
        "{}",
        edited_message(reference, version.as_deref(), dryrun::is_dry_run())
    );
    Ok(())
}

fn edited_message(reference: &ResourceRef, version: Option<&str>, dry_run: bool) -> String {
    if dry_run {
        return format!("{} edit validated by the server (dry run, not persisted)", reference);
    }

    match version {
        Some(version) => format!("{} edited (resourceVersion {})", reference, version),
        None => format!("{} edited", reference),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edited_message() {
        let reference = ResourceRef::new(ResourceKind::Ingress, "prod", "site").unwrap();
        assert_eq!(
            edited_message(&reference, Some("1043"), false),
            "ingress prod/site edited (resourceVersion 1043)"
        );
        assert_eq!(edited_message(&reference, None, false), "ingress prod/site edited");
    }

    #[test]
    fn test_dry_run_message_does_not_claim_an_edit() {
        let reference = ResourceRef::new(ResourceKind::Deployment, "prod", "web").unwrap();
        let message = edited_message(&reference, Some("1043"), true);
        assert_eq!(
            message,
            "deployment prod/web edit validated by the server (dry run, not persisted)"
        );
        assert!(!message.contains("edited"));
    }
}
