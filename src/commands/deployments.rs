//! Deployment description and scaling

use anyhow::{Context, Result, anyhow};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{EnvVar, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::fmt::Write;

use super::events::format_time;
use super::pods::format_ports;
use crate::k8s::{ResourceRef, ResourceStore, ScaleRequest};

/// Print details of a single deployment
pub async fn describe_deployment<S>(store: &S, reference: &ResourceRef) -> Result<()>
where
    S: ResourceStore<Deployment>,
{
    let deployment = store.fetch(reference).await?;
    print!("{}", render_deployment(&deployment));
    Ok(())
}

pub fn render_deployment(deployment: &Deployment) -> String {
    let spec = deployment.spec.as_ref();
    let status = deployment.status.as_ref();
    let mut out = String::new();

    let _ = writeln!(out, "Name: {}", deployment.name_any());
    let _ = writeln!(out, "Namespace: {}", deployment.namespace().unwrap_or_default());
    let _ = writeln!(out, "Labels: {}", format_pairs(deployment.labels().iter()));
    let _ = writeln!(
        out,
        "Annotations: {}",
        format_pairs(deployment.annotations().iter())
    );
    let _ = writeln!(
        out,
        "Replicas: {}",
        spec.and_then(|s| s.replicas).unwrap_or(1)
    );
    let _ = writeln!(
        out,
        "Selector: {}",
        format_pairs(
            spec.and_then(|s| s.selector.match_labels.as_ref())
                .into_iter()
                .flatten()
        )
    );
    let _ = writeln!(
        out,
        "Strategy: {}",
        spec.and_then(|s| s.strategy.as_ref())
            .and_then(|s| s.type_.as_deref())
            .unwrap_or("RollingUpdate")
    );
    let _ = writeln!(
        out,
        "Min Ready Seconds: {}",
        spec.and_then(|s| s.min_ready_seconds).unwrap_or_default()
    );

    out.push_str("Containers:\n");
    let containers = spec
        .and_then(|s| s.template.spec.as_ref())
        .map(|p| p.containers.as_slice())
        .unwrap_or_default();
    for container in containers {
        let _ = writeln!(out, "  Name: {}", container.name);
        let _ = writeln!(
            out,
            "  Image: {}",
            container.image.as_deref().unwrap_or("<none>")
        );
        let _ = writeln!(out, "  Ports: {}", format_ports(container.ports.as_deref()));
        let _ = writeln!(out, "  Env: {}", format_env(container.env.as_deref()));
        let _ = writeln!(
            out,
            "  Resources: {}",
            format_resources(container.resources.as_ref())
        );
    }

    out.push_str("Conditions:\n");
    for condition in status
        .and_then(|s| s.conditions.as_deref())
        .unwrap_or_default()
    {
        let _ = writeln!(out, "  Type: {}", condition.type_);
        let _ = writeln!(out, "  Status: {}", condition.status);
        let _ = writeln!(
            out,
            "  Reason: {}",
            condition.reason.as_deref().unwrap_or_default()
        );
        let _ = writeln!(
            out,
            "  Message: {}",
            condition.message.as_deref().unwrap_or_default()
        );
        let _ = writeln!(
            out,
            "  Last Update Time: {}",
            format_time(condition.last_update_time.as_ref())
        );
        let _ = writeln!(
            out,
            "  Last Transition Time: {}",
            format_time(condition.last_transition_time.as_ref())
        );
    }

    let _ = writeln!(
        out,
        "Available Replicas: {}",
        status.and_then(|s| s.available_replicas).unwrap_or_default()
    );
    let _ = writeln!(
        out,
        "Unavailable Replicas: {}",
        status
            .and_then(|s| s.unavailable_replicas)
            .unwrap_or_default()
    );

    out
}

fn format_pairs<'a>(pairs: impl Iterator<Item = (&'a String, &'a String)>) -> String {
    let pairs: Vec<String> = pairs.map(|(k, v)| format!("{}={}", k, v)).collect();
    if pairs.is_empty() {
        "<none>".to_string()
    } else {
        pairs.join(", ")
    }
}

fn format_env(env: Option<&[EnvVar]>) -> String {
    let vars: Vec<String> = env
        .unwrap_or_default()
        .iter()
        .map(|var| match (&var.value, &var.value_from) {
            (Some(value), _) => format!("{}={}", var.name, value),
            (None, Some(_)) => format!("{}=<from reference>", var.name),
            (None, None) => format!("{}=", var.name),
        })
        .collect();

    if vars.is_empty() {
        "<none>".to_string()
    } else {
        vars.join(", ")
    }
}

fn format_resources(resources: Option<&ResourceRequirements>) -> String {
    let Some(resources) = resources else {
        return "<none>".to_string();
    };

    let side = |label: &str, values: Option<&BTreeMap<String, Quantity>>| {
        values.filter(|v| !v.is_empty()).map(|v| {
            let list: Vec<String> = v.iter().map(|(k, q)| format!("{}={}", k, q.0)).collect();
            format!("{} {}", label, list.join(","))
        })
    };

    let parts: Vec<String> = [
        side("requests", resources.requests.as_ref()),
        side("limits", resources.limits.as_ref()),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        "<none>".to_string()
    } else {
        parts.join("; ")
    }
}

/// Set `spec.replicas` on a deployment and replace it
pub async fn scale<S>(store: &S, request: &ScaleRequest) -> Result<Deployment>
where
    S: ResourceStore<Deployment>,
{
    let reference = &request.reference;
    let mut deployment = store
        .fetch(reference)
        .await
        .context("Error fetching deployment")?;

    let spec = deployment
        .spec
        .as_mut()
        .ok_or_else(|| anyhow!("{} has no spec", reference))?;
    let previous = spec.replicas.unwrap_or(1);
    spec.replicas = Some(request.replicas);

    crate::log_info!(
        "Scaling {} from {} to {} replicas",
        reference,
        previous,
        request.replicas
    );

    store
        .submit(reference, &deployment)
        .await
        .context("Error updating replicas")
}

/// What `kadmin scale` prints once the replace went through
pub fn scaled_message(request: &ScaleRequest, dry_run: bool) -> String {
    let reference = &request.reference;
    if dry_run {
        format!(
            "Dry run: deployment {} in namespace {} would be scaled to {} (not persisted)",
            reference.name, reference.namespace, request.replicas
        )
    } else {
        format!(
            "Successfully updated replicas for deployment {} in namespace {} to {}",
            reference.name, reference.namespace, request.replicas
        )
    }
}
