// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kwatch::cloud::{ComputeBackendServices, GoogleTokenSource, TokenSource};
use kwatch::config::Config;
use kwatch::constants::{DEFAULT_WATCH_RESOURCES, INGRESSES_PATH, NAMESPACES_PATH};
use kwatch::credentials::{resolve, CredentialSources};
use kwatch::kubernetes::{
    watch, watch_concurrently, watch_concurrently_fail_fast, BlockingSession, Session, WatchTask,
};
use kwatch::reconcilers::{EventLogger, TimeoutReconciler};
use kwatch::types::{ClusterConfig, ResourceView};

#[derive(Parser)]
#[command(name = "kwatch", about = "Watch Kubernetes resources and react to their changes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List namespaces, once with a blocking and once with an async session
    Namespaces,
    /// Log every change of the given resources, each on its own stream
    Watch {
        /// API paths such as `api/v1/pods`; defaults to a set of common resources
        resources: Vec<String>,
        /// Stop all watches as soon as one fails
        #[arg(long)]
        fail_fast: bool,
    },
    /// Set load-balancer backend timeouts whenever an ingress is modified
    AdjustTimeout {
        /// Google Cloud project owning the backends (overrides GCLOUD_PROJECT)
        #[arg(long)]
        project: Option<String>,
        #[arg(long, default_value = INGRESSES_PATH)]
        resource: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let http = reqwest::Client::new();
    let tokens: Arc<dyn TokenSource> = Arc::new(GoogleTokenSource::from_env(http.clone()));
    let sources = CredentialSources::from_env(config.kubeconfig.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;
    let cluster = runtime
        .block_on(resolve(&sources, tokens.as_ref()))
        .context("Failed to load cluster credentials")?;
    info!("Resolved credentials for {}", cluster.base_url());

    match cli.command {
        Command::Namespaces => {
            list_namespaces_blocking(&cluster)?;
            runtime.block_on(list_namespaces(&cluster))
        }
        Command::Watch {
            resources,
            fail_fast,
        } => {
            let resources = if resources.is_empty() {
                DEFAULT_WATCH_RESOURCES.iter().map(|r| r.to_string()).collect()
            } else {
                resources
            };
            runtime.block_on(watch_resources(&cluster, resources, fail_fast))
        }
        Command::AdjustTimeout { project, resource } => {
            let project = match project {
                Some(p) => p,
                None => config.require_project()?.to_string(),
            };
            let patcher = ComputeBackendServices::new(http, tokens);
            let reconciler = TimeoutReconciler::new(patcher, project, config.timeout.clone());
            runtime.block_on(adjust_timeouts(&cluster, &resource, reconciler))
        }
    }
}

fn list_namespaces_blocking(cluster: &ClusterConfig) -> Result<()> {
    info!("--- Blocking session ---");
    // The blocking session runs its own runtime, so it lives on a plain thread
    let cluster = cluster.clone();
    let items = std::thread::spawn(move || {
        BlockingSession::connect(&cluster)?.list(NAMESPACES_PATH)
    })
    .join()
    .map_err(|_| anyhow::anyhow!("Blocking namespace listing panicked"))??;

    for item in &items {
        println!("{}", ResourceView(item).name().unwrap_or("<None>"));
    }
    Ok(())
}

async fn list_namespaces(cluster: &ClusterConfig) -> Result<()> {
    info!("--- Async session ---");
    let session = Session::connect(cluster).await?;
    for item in session.list(NAMESPACES_PATH).await? {
        println!("{}", ResourceView(&item).name().unwrap_or("<None>"));
    }
    Ok(())
}

async fn watch_resources(cluster: &ClusterConfig, resources: Vec<String>, fail_fast: bool) -> Result<()> {
    let mut tasks = Vec::with_capacity(resources.len());
    for resource_path in resources {
        tasks.push(WatchTask {
            session: Session::connect(cluster).await?,
            resource_path,
            handler: EventLogger::default(),
        });
    }
    let total = tasks.len();

    if fail_fast {
        watch_concurrently_fail_fast(tasks).await?;
        return Ok(());
    }

    let failed = watch_concurrently(tasks)
        .await
        .iter()
        .filter(|r| r.is_err())
        .count();
    if failed > 0 {
        anyhow::bail!("{} of {} watches failed", failed, total);
    }
    Ok(())
}

async fn adjust_timeouts(
    cluster: &ClusterConfig,
    resource: &str,
    mut reconciler: TimeoutReconciler<ComputeBackendServices>,
) -> Result<()> {
    let session = Session::connect(cluster).await?;
    info!("Starting to watch ingresses");
    watch(&session, resource, &mut reconciler).await?;
    Ok(())
}
