//! Print cluster events

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Event;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::api::{Api, ListParams};
use kube::{Client, ResourceExt};
use std::fmt::Write;

const SEPARATOR: &str = "----------------------------------------------------";

pub async fn show_events(client: &Client, namespace: Option<&str>) -> Result<()> {
    let api: Api<Event> = match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    };

    let events = api
        .list(&ListParams::default())
        .await
        .context("Failed to retrieve events")?;

    for event in &events.items {
        print!("{}", render_event(event));
    }

    Ok(())
}

pub fn render_event(event: &Event) -> String {
    let involved = &event.involved_object;
    let mut out = String::new();

    let _ = writeln!(out, "Event: {}", event.message.as_deref().unwrap_or_default());
    let _ = writeln!(out, "Reason: {}", event.reason.as_deref().unwrap_or_default());
    let _ = writeln!(out, "Type: {}", event.type_.as_deref().unwrap_or_default());
    let _ = writeln!(
        out,
        "Source: {}",
        event
            .source
            .as_ref()
            .and_then(|s| s.component.as_deref())
            .unwrap_or_default()
    );
    let _ = writeln!(out, "Namespace: {}", event.namespace().unwrap_or_default());
    let _ = writeln!(
        out,
        "Involved Object: {}/{}",
        involved.kind.as_deref().unwrap_or_default(),
        involved.name.as_deref().unwrap_or_default()
    );
    let _ = writeln!(out, "First Timestamp: {}", format_time(event.first_timestamp.as_ref()));
    let _ = writeln!(out, "Last Timestamp: {}", format_time(event.last_timestamp.as_ref()));
    let _ = writeln!(out, "Count: {}", event.count.unwrap_or_default());
    let _ = writeln!(out, "{}", SEPARATOR);

    out
}

pub(crate) fn format_time(time: Option<&Time>) -> String {
    time.map(|t| t.0.to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}
