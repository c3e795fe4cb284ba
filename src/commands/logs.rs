//! Print or stream pod logs

use anyhow::{Context, Result};
use futures::{AsyncBufReadExt, TryStreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::Client;
use kube::api::{Api, LogParams};
use regex::Regex;
use std::pin::pin;

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub container: Option<String>,
    pub tail_lines: Option<i64>,
    pub follow: bool,
    pub grep: Option<Regex>,
}

impl LogOptions {
    fn params(&self) -> LogParams {
        LogParams {
            container: self.container.clone(),
            tail_lines: self.tail_lines,
            follow: self.follow,
            ..Default::default()
        }
    }
}

pub async fn show_logs(client: &Client, namespace: &str, pod: &str, options: &LogOptions) -> Result<()> {
    let api: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let params = options.params();

    if !options.follow {
        let logs = api
            .logs(pod, &params)
            .await
            .with_context(|| format!("Failed to get logs for pod {}/{}", namespace, pod))?;

        for line in matching_lines(&logs, options.grep.as_ref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    crate::log_info!("Following logs for pod {}/{}", namespace, pod);
    let stream = api
        .log_stream(pod, &params)
        .await
        .with_context(|| format!("Failed to stream logs for pod {}/{}", namespace, pod))?;
    let mut lines = pin!(stream.lines());

    while let Some(line) = lines.try_next().await.context("Log stream interrupted")? {
        if line_matches(&line, options.grep.as_ref()) {
            println!("{}", line);
        }
    }

    Ok(())
}

fn line_matches(line: &str, grep: Option<&Regex>) -> bool {
    grep.is_none_or(|re| re.is_match(line))
}

/// Lines of `logs` kept by the optional `--grep` pattern
pub fn matching_lines<'a>(logs: &'a str, grep: Option<&'a Regex>) -> impl Iterator<Item = &'a str> + 'a {
    logs.lines().filter(move |line| line_matches(line, grep))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGS: &str = "starting server\nGET /health 200\nGET /api 500\nshutting down\n";

    #[test]
    fn test_all_lines_without_grep() {
        assert_eq!(matching_lines(LOGS, None).count(), 4);
    }

    #[test]
    fn test_grep_filters_lines() {
        let re = Regex::new(r"GET .* 5\d\d").unwrap();
        let lines: Vec<_> = matching_lines(LOGS, Some(&re)).collect();
        assert_eq!(lines, vec!["GET /api 500"]);
    }

    #[test]
    fn test_params_carry_options() {
        let options = LogOptions {
            container: Some("sidecar".into()),
            tail_lines: Some(50),
            follow: true,
            grep: None,
        };
        let params = options.params();
        assert_eq!(params.container.as_deref(), Some("sidecar"));
        assert_eq!(params.tail_lines, Some(50));
        assert!(params.follow);
    }
}
