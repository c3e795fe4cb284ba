//! Kubernetes client construction

use anyhow::{Context, Result};
use kube::Client;
use kube::config::{KubeConfigOptions, Kubeconfig};
use std::path::{Path, PathBuf};

/// Where to find cluster credentials
#[derive(Debug, Clone, Default)]
pub struct ClusterOptions {
    /// Explicit kubeconfig file, or a `KUBECONFIG`-style list of files merged
    /// in order; falls back to the standard lookup when unset
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use instead of the current one
    pub context: Option<String>,
}

impl ClusterOptions {
    fn kube_options(&self) -> KubeConfigOptions {
        KubeConfigOptions {
            context: self.context.clone(),
            ..Default::default()
        }
    }
}

/// Read one kubeconfig file, or merge a path list the way `KUBECONFIG` does:
/// empty entries are skipped and the first file to set a value wins
pub fn read_kubeconfig(paths: &Path) -> Result<Kubeconfig> {
    let files: Vec<PathBuf> = std::env::split_paths(paths)
        .filter(|p| !p.as_os_str().is_empty())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No kubeconfig file given in '{}'", paths.display());
    }

    files.iter().try_fold(Kubeconfig::default(), |merged, file| {
        let next = Kubeconfig::read_from(file)
            .with_context(|| format!("Failed to read kubeconfig: {}", file.display()))?;
        merged
            .merge(next)
            .with_context(|| format!("Failed to merge kubeconfig: {}", file.display()))
    })
}

/// Build the single client shared by every command of this invocation
pub async fn connect(options: &ClusterOptions) -> Result<Client> {
    let config = match (&options.kubeconfig, &options.context) {
        (Some(path), _) => {
            tracing::debug!(kubeconfig = %path.display(), "reading kubeconfig");
            let kubeconfig = read_kubeconfig(path)?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &options.kube_options())
                .await
                .with_context(|| format!("Failed to load kubeconfig: {}", path.display()))?
        }
        (None, Some(context)) => kube::Config::from_kubeconfig(&options.kube_options())
            .await
            .with_context(|| format!("Failed to load kubeconfig context '{}'", context))?,
        (None, None) => kube::Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration")?,
    };

    tracing::debug!(cluster_url = %config.cluster_url, "connecting to cluster");

    Client::try_from(config).context("Failed to create Kubernetes client")
}
