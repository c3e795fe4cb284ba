//! Cleanup command: delete broken pods across all namespaces

use anyhow::{Result, bail};
use colored::Colorize;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams};
use kube::{Client, ResourceExt};
use std::fmt;
use std::future::Future;

use super::pods::fetch_pods;
use crate::config::Settings;
use crate::utils::{dryrun, progress, prompt};

/// Which pods a cleanup sweep removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupMode {
    /// Every pod whose phase is not `Running`
    NotRunning,
    /// Pods with a container waiting in `ImagePullBackOff`
    ImagePullBackOff,
}

impl CleanupMode {
    fn matches(&self, pod: &Pod) -> bool {
        let status = pod.status.as_ref();
        match self {
            CleanupMode::NotRunning => {
                status.and_then(|s| s.phase.as_deref()) != Some("Running")
            }
            CleanupMode::ImagePullBackOff => status
                .and_then(|s| s.container_statuses.as_deref())
                .unwrap_or_default()
                .iter()
                .filter_map(|cs| cs.state.as_ref()?.waiting.as_ref()?.reason.as_deref())
                .any(|reason| reason == "ImagePullBackOff"),
        }
    }
}

impl fmt::Display for CleanupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupMode::NotRunning => f.write_str("not running"),
            CleanupMode::ImagePullBackOff => f.write_str("in ImagePullBackOff"),
        }
    }
}

/// A pod picked for deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodTarget {
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for PodTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

pub fn select_pods(pods: &[Pod], mode: CleanupMode) -> Vec<PodTarget> {
    pods.iter()
        .filter(|pod| mode.matches(pod))
        .map(|pod| PodTarget {
            namespace: pod.namespace().unwrap_or_default(),
            name: pod.name_any(),
        })
        .collect()
}

/// Outcome of a sweep
#[derive(Debug, Default)]
pub struct SweepReport {
    pub deleted: Vec<PodTarget>,
    pub failed: Vec<(PodTarget, String)>,
}

impl SweepReport {
    /// Fail when any delete failed, naming the pods left behind
    pub fn into_result(self) -> Result<()> {
        if self.failed.is_empty() {
            return Ok(());
        }

        let total = self.deleted.len() + self.failed.len();
        let pods: Vec<String> = self.failed.iter().map(|(t, _)| t.to_string()).collect();
        bail!(
            "{} of {} pod deletions failed: {}",
            self.failed.len(),
            total,
            pods.join(", ")
        )
    }
}

/// Delete every target, logging failures and carrying on with the rest
pub async fn sweep<F, Fut>(targets: Vec<PodTarget>, dry_run: bool, delete: F) -> SweepReport
where
    F: Fn(PodTarget) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let pb = progress::create_progress_bar(targets.len() as u64, "Deleting pods");
    let pb = if dry_run { progress::hidden(pb) } else { pb };
    let mut report = SweepReport::default();

    for target in targets {
        if dry_run {
            dryrun::log_action(&format!("Delete pod {}", target));
            report.deleted.push(target);
            pb.inc(1);
            continue;
        }

        match delete(target.clone()).await {
            Ok(()) => {
                pb.println(format!("Deleted pod {} in namespace {}", target.name, target.namespace));
                report.deleted.push(target);
            }
            Err(e) => {
                crate::log_error!("Error deleting pod {}: {:#}", target, e);
                report.failed.push((target, format!("{:#}", e)));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    report
}

/// Find and delete pods matching `mode` in every namespace
pub async fn cleanup(client: &Client, settings: &Settings, mode: CleanupMode, assume_yes: bool) -> Result<()> {
    let spinner = progress::create_spinner("Listing pods in all namespaces...");
    let pods = fetch_pods(client, None).await;
    spinner.finish_and_clear();

    let targets = select_pods(&pods?, mode);
    if targets.is_empty() {
        println!("No pods {} found", mode);
        return Ok(());
    }

    println!("{} pod(s) {}:", targets.len(), mode);
    for target in &targets {
        println!("  {}", target);
    }

    let ask = settings.behavior.confirm_destructive && !assume_yes && !dryrun::is_dry_run();
    if ask && !prompt::confirm_delete(targets.len(), "pod")? {
        crate::log_warn!("Cleanup cancelled");
        return Ok(());
    }

    let report = sweep(targets, dryrun::is_dry_run(), |target| {
        let api: Api<Pod> = Api::namespaced(client.clone(), &target.namespace);
        async move {
            api.delete(&target.name, &DeleteParams::default()).await?;
            Ok(())
        }
    })
    .await;

    println!(
        "{} {} deleted, {} failed",
        "Cleanup complete:".green().bold(),
        report.deleted.len(),
        report.failed.len()
    );

    report.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use k8s_openapi::api::core::v1::{
        ContainerState, ContainerStateWaiting, ContainerStatus, PodStatus,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn pod(name: &str, phase: Option<&str>, waiting: Option<&str>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some("default".into()),
                ..Default::default()
            },
            status: Some(PodStatus {
                phase: phase.map(str::to_string),
                container_statuses: waiting.map(|reason| {
                    vec![ContainerStatus {
                        name: "app".into(),
                        state: Some(ContainerState {
                            waiting: Some(ContainerStateWaiting {
                                reason: Some(reason.into()),
                                ..Default::default()
                            }),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }]
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn names(targets: &[PodTarget]) -> Vec<&str> {
        targets.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_select_not_running() {
        let pods = vec![
            pod("ok", Some("Running"), None),
            pod("done", Some("Succeeded"), None),
            pod("pending", Some("Pending"), Some("ImagePullBackOff")),
            pod("unknown", None, None),
        ];
        assert_eq!(
            names(&select_pods(&pods, CleanupMode::NotRunning)),
            vec!["done", "pending", "unknown"]
        );
    }

    #[test]
    fn test_select_image_pull_backoff() {
        let pods = vec![
            pod("ok", Some("Running"), None),
            pod("crashing", Some("Running"), Some("CrashLoopBackOff")),
            pod("pending", Some("Pending"), Some("ImagePullBackOff")),
        ];
        let targets = select_pods(&pods, CleanupMode::ImagePullBackOff);
        assert_eq!(names(&targets), vec!["pending"]);
        assert_eq!(targets[0].to_string(), "default/pending");
    }

    #[test]
    fn test_sweep_continues_after_failure() {
        let targets = vec![
            PodTarget { namespace: "a".into(), name: "one".into() },
            PodTarget { namespace: "a".into(), name: "two".into() },
            PodTarget { namespace: "b".into(), name: "three".into() },
        ];

        let report = tokio_test::block_on(sweep(targets, false, |target| async move {
            if target.name == "two" {
                Err(anyhow!("pods \"two\" is forbidden"))
            } else {
                Ok(())
            }
        }));

        assert_eq!(names(&report.deleted), vec!["one", "three"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0.name, "two");
        assert!(report.failed[0].1.contains("forbidden"));
    }

    #[test]
    fn test_failed_deletes_fail_the_sweep() {
        let targets = vec![
            PodTarget { namespace: "a".into(), name: "one".into() },
            PodTarget { namespace: "a".into(), name: "two".into() },
        ];

        let report = tokio_test::block_on(sweep(targets, false, |target| async move {
            if target.name == "two" {
                Err(anyhow!("connection refused"))
            } else {
                Ok(())
            }
        }));

        let err = report.into_result().unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 pod deletions failed: a/two");
    }

    #[test]
    fn test_clean_sweep_succeeds() {
        let targets = vec![PodTarget { namespace: "a".into(), name: "one".into() }];
        let report = tokio_test::block_on(sweep(targets, false, |_| async { Ok(()) }));
        assert!(report.into_result().is_ok());
    }
}
