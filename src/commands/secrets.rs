//! Print secret values

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::{Api, ListParams};
use kube::{Client, ResourceExt};
use regex::Regex;
use std::fmt::Write;

pub async fn show_secrets(
    client: &Client,
    namespace: Option<&str>,
    filter: Option<&Regex>,
) -> Result<()> {
    let api: Api<Secret> = match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    };

    let secrets = api
        .list(&ListParams::default())
        .await
        .context("Failed to list secrets")?;

    for secret in secrets
        .items
        .iter()
        .filter(|s| filter.is_none_or(|re| re.is_match(&s.name_any())))
    {
        print!("{}", render_secret(secret));
    }

    Ok(())
}

/// Name, then every key with its decoded value in key order
pub fn render_secret(secret: &Secret) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Secret Name: {}", secret.name_any());

    if let Some(data) = &secret.data {
        for (key, value) in data {
            let _ = writeln!(out, "  Key: {}, Value: {}", key, decode_value(value));
        }
    }

    out
}

/// Secret data arrives base64-decoded; show it as text unless it is binary
pub fn decode_value(value: &ByteString) -> String {
    match std::str::from_utf8(&value.0) {
        Ok(text) if !text.chars().any(|c| c.is_control() && !c.is_whitespace()) => {
            text.to_string()
        }
        _ => format!("<{} bytes>", value.0.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    #[test]
    fn test_render_secret_sorted_and_decoded() {
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some("db-credentials".into()),
                ..Default::default()
            },
            data: Some(
                [
                    ("username".to_string(), ByteString(b"admin".to_vec())),
                    ("password".to_string(), ByteString(b"s3cr3t".to_vec())),
                ]
                .into(),
            ),
            ..Default::default()
        };

        assert_eq!(
            render_secret(&secret),
            "Secret Name: db-credentials\n  Key: password, Value: s3cr3t\n  Key: username, Value: admin\n"
        );
    }

    #[test]
    fn test_binary_values_are_summarized() {
        assert_eq!(decode_value(&ByteString(vec![0xff, 0x00, 0x10])), "<3 bytes>");
        assert_eq!(decode_value(&ByteString(vec![0x00, 0x01])), "<2 bytes>");
        assert_eq!(decode_value(&ByteString(b"line1\nline2".to_vec())), "line1\nline2");
    }

    #[test]
    fn test_secret_without_data() {
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some("empty".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(render_secret(&secret), "Secret Name: empty\n");
    }
}
