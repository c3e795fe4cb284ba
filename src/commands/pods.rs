//! Pod listing and description

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::{ContainerPort, Pod};
use kube::api::{Api, ListParams};
use kube::{Client, ResourceExt};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Pods in `namespace`, or across the cluster when `None`
pub async fn fetch_pods(client: &Client, namespace: Option<&str>) -> Result<Vec<Pod>> {
    let api: Api<Pod> = match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    };

    let pods = api
        .list(&ListParams::default())
        .await
        .context("Failed to list pods")?;

    Ok(pods.items)
}

/// Print one line per pod
pub async fn list_pods(client: &Client, namespace: Option<&str>, filter: Option<&Regex>) -> Result<()> {
    let pods = fetch_pods(client, namespace).await?;
    crate::log_info!("Found {} pods", pods.len());

    for pod in pods
        .iter()
        .filter(|pod| filter.is_none_or(|re| re.is_match(&pod.name_any())))
    {
        println!("{}", render_pod_line(pod));
    }

    Ok(())
}

pub fn render_pod_line(pod: &Pod) -> String {
    format!(
        "Namespace: {}, Pod Name: {}",
        pod.namespace().unwrap_or_default(),
        pod.name_any()
    )
}

/// Print details of a single pod
pub async fn describe_pod(client: &Client, namespace: &str, name: &str) -> Result<()> {
    let api: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let pod = api
        .get(name)
        .await
        .with_context(|| format!("Failed to get pod {}/{}", namespace, name))?;

    print!("{}", render_pod(&pod));
    Ok(())
}

pub fn render_pod(pod: &Pod) -> String {
    let spec = pod.spec.as_ref();
    let phase = pod
        .status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("Unknown");

    let mut out = String::new();
    let _ = writeln!(out, "Pod Name: {}", pod.name_any());
    let _ = writeln!(out, "Namespace: {}", pod.namespace().unwrap_or_default());
    let _ = writeln!(
        out,
        "Node Name: {}",
        spec.and_then(|s| s.node_name.as_deref()).unwrap_or("<none>")
    );
    let _ = writeln!(out, "Status: {}", phase);

    out.push_str("Labels:\n");
    write_map(&mut out, pod.labels());
    out.push_str("Annotations:\n");
    write_map(&mut out, pod.annotations());

    out.push_str("Containers:\n");
    for container in spec.map(|s| s.containers.as_slice()).unwrap_or_default() {
        let _ = writeln!(out, "  Name: {}", container.name);
        let _ = writeln!(
            out,
            "  Image: {}",
            container.image.as_deref().unwrap_or("<none>")
        );
        let _ = writeln!(out, "  Ports: {}", format_ports(container.ports.as_deref()));
    }

    out
}

pub(crate) fn write_map(out: &mut String, map: &BTreeMap<String, String>) {
    for (key, value) in map {
        let _ = writeln!(out, "  {}: {}", key, value);
    }
}

pub(crate) fn format_ports(ports: Option<&[ContainerPort]>) -> String {
    let ports: Vec<String> = ports
        .unwrap_or_default()
        .iter()
        .map(|p| {
            let protocol = p.protocol.as_deref().unwrap_or("TCP");
            match &p.name {
                Some(name) => format!("{}/{} ({})", p.container_port, protocol, name),
                None => format!("{}/{}", p.container_port, protocol),
            }
        })
        .collect();

    if ports.is_empty() {
        "<none>".to_string()
    } else {
        ports.join(", ")
    }
}
