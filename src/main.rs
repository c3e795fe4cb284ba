//! kadmin CLI - everyday Kubernetes administration

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use kadmin::commands::cleanup::CleanupMode;
use kadmin::commands::logs::LogOptions;
use kadmin::config::Settings;
use kadmin::k8s::{ClusterOptions, KubeStore, ResourceKind, ResourceRef, ScaleRequest};
use kadmin::utils::errors::display_error_and_exit;
use kadmin::utils::{dryrun, enhance_error, logger};
use kadmin::{commands, log_info};
use kube::Client;
use regex::Regex;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kadmin")]
#[command(author, version, about = "Administrative CLI for Kubernetes clusters", long_about = None)]
struct Cli {
    /// Verbose output (can be used multiple times: -v, -vv, -vvv)
    /// -v: INFO, -vv: DEBUG, -vvv: TRACE
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Dry-run mode: show what would be done without making changes
    #[arg(long, global = true)]
    dry_run: bool,

    /// Kubeconfig file or path list; KUBECONFIG is honored when unset
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List pods
    List {
        /// Only list pods in this namespace
        #[arg(short, long, conflicts_with = "all_namespaces")]
        namespace: Option<String>,

        /// List pods in every namespace (the default)
        #[arg(short = 'A', long)]
        all_namespaces: bool,

        /// Only show pods whose name matches this regex
        #[arg(long)]
        filter: Option<Regex>,
    },

    /// Show secrets with their decoded values
    Secrets {
        #[arg(short, long)]
        namespace: Option<String>,

        /// Only show secrets whose name matches this regex
        #[arg(long)]
        filter: Option<Regex>,
    },

    /// Show cluster events
    Events {
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Describe a pod or deployment
    Describe {
        #[command(subcommand)]
        target: DescribeTarget,
    },

    /// Set the replica count of a deployment
    Scale {
        /// Deployment and count as <namespace>:<deployment-name>:<replica-count>
        request: ScaleRequest,
    },

    /// Edit a resource in your editor and apply the result
    Edit {
        /// Resource kind
        #[arg(value_enum)]
        kind: ResourceKind,

        /// Namespace, or <namespace>/<name>
        namespace: String,

        /// Resource name
        name: Option<String>,
    },

    /// Print pod logs
    Logs {
        /// Pod name
        pod: String,

        #[arg(short, long)]
        namespace: Option<String>,

        /// Container name, for pods with more than one
        #[arg(short, long)]
        container: Option<String>,

        /// Only show the last N lines
        #[arg(long)]
        tail: Option<i64>,

        /// Stream new lines as they are written
        #[arg(short, long)]
        follow: bool,

        /// Only print lines matching this regex
        #[arg(long)]
        grep: Option<Regex>,
    },

    /// Delete pods that are not running
    Cleanup {
        /// Only delete pods stuck in ImagePullBackOff
        #[arg(long)]
        image_pull_backoff: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print an example configuration file
    Config,

    /// Generate shell completion scripts
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum DescribeTarget {
    /// Describe a pod
    Pod {
        name: String,

        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Describe a deployment given as <namespace>/<name>
    Deployment { reference: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    if let Err(err) = run(cli).await {
        display_error_and_exit(enhance_error(&err));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load();

    if cli.dry_run {
        dryrun::set_dry_run(true);
        log_info!("DRY RUN MODE: No changes will be made");
    }

    match cli.command {
        Commands::Config => {
            print!("{}", Settings::example_config());
            return Ok(());
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "kadmin", &mut io::stdout());
            return Ok(());
        }
        Commands::Version => {
            println!("kadmin {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    let options = ClusterOptions {
        kubeconfig: cli
            .kubeconfig
            .or_else(|| settings.defaults.kubeconfig.as_ref().map(PathBuf::from)),
        context: cli.context.or_else(|| settings.defaults.context.clone()),
    };
    let client = kadmin::k8s::connect(&options).await?;

    dispatch(cli.command, &client, &settings).await
}

async fn dispatch(command: Commands, client: &Client, settings: &Settings) -> Result<()> {
    let default_ns = settings.defaults.namespace.as_str();

    match command {
        Commands::List {
            namespace,
            all_namespaces: _,
            filter,
        } => commands::pods::list_pods(client, namespace.as_deref(), filter.as_ref()).await,
        Commands::Secrets { namespace, filter } => {
            commands::secrets::show_secrets(client, namespace.as_deref(), filter.as_ref()).await
        }
        Commands::Events { namespace } => {
            commands::events::show_events(client, namespace.as_deref()).await
        }
        Commands::Describe { target } => match target {
            DescribeTarget::Pod { name, namespace } => {
                let namespace = namespace.as_deref().unwrap_or(default_ns);
                commands::pods::describe_pod(client, namespace, &name).await
            }
            DescribeTarget::Deployment { reference } => {
                let reference = ResourceRef::parse_slashed(ResourceKind::Deployment, &reference)?;
                let store = KubeStore::new(client.clone());
                commands::deployments::describe_deployment(&store, &reference).await
            }
        },
        Commands::Scale { request } => {
            let store = KubeStore::new(client.clone()).with_dry_run(dryrun::is_dry_run());
            dryrun::log_action(&format!(
                "Scale {} to {} replicas (validated, not persisted)",
                request.reference, request.replicas
            ));
            commands::deployments::scale(&store, &request).await?;
            println!(
                "{}",
                commands::deployments::scaled_message(&request, dryrun::is_dry_run())
            );
            Ok(())
        }
        Commands::Edit {
            kind,
            namespace,
            name,
        } => {
            let reference = ResourceRef::from_args(kind, &namespace, name.as_deref())?;
            commands::edit::edit(client, settings, &reference).await
        }
        Commands::Logs {
            pod,
            namespace,
            container,
            tail,
            follow,
            grep,
        } => {
            let namespace = namespace.as_deref().unwrap_or(default_ns);
            let options = LogOptions {
                container,
                tail_lines: tail,
                follow,
                grep,
            };
            commands::logs::show_logs(client, namespace, &pod, &options).await
        }
        Commands::Cleanup {
            image_pull_backoff,
            yes,
        } => {
            let mode = if image_pull_backoff {
                CleanupMode::ImagePullBackOff
            } else {
                CleanupMode::NotRunning
            };
            commands::cleanup::cleanup(client, settings, mode, yes).await
        }
        Commands::Config | Commands::Completion { .. } | Commands::Version => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_edit_accepts_shorthand() {
        let cli = Cli::try_parse_from(["kadmin", "edit", "deployment", "prod/web"]).unwrap();
        let Commands::Edit { kind, namespace, name } = cli.command else {
            panic!("expected edit");
        };
        let reference = ResourceRef::from_args(kind, &namespace, name.as_deref()).unwrap();
        assert_eq!(reference.to_string(), "deployment prod/web");
    }

    #[test]
    fn test_scale_rejects_negative_count() {
        assert!(Cli::try_parse_from(["kadmin", "scale", "prod:web:-1"]).is_err());
        assert!(Cli::try_parse_from(["kadmin", "scale", "prod:web:2"]).is_ok());
    }
}
