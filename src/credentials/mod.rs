// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Credential discovery: in-cluster service account, minikube, then GKE.

pub mod in_cluster;
pub mod kubeconfig;

pub use in_cluster::load_in_cluster;
pub use kubeconfig::{load_gke, load_minikube, KubeconfigFile};

use crate::cloud::TokenSource;
use crate::constants::in_cluster::{CA_PATH, SERVER_ADDR_ENV, TOKEN_PATH};
use crate::error::{KwatchError, Result};
use crate::types::ClusterConfig;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Where each strategy looks for its inputs
#[derive(Debug, Clone)]
pub struct CredentialSources {
    pub kubeconfig: Option<PathBuf>,
    pub token_path: PathBuf,
    pub ca_path: PathBuf,
    pub server_addr: Option<String>,
}

impl CredentialSources {
    /// Well-known pod paths plus the API server address from the environment
    pub fn from_env(kubeconfig: Option<PathBuf>) -> Self {
        Self {
            kubeconfig,
            token_path: PathBuf::from(TOKEN_PATH),
            ca_path: PathBuf::from(CA_PATH),
            server_addr: std::env::var(SERVER_ADDR_ENV).ok(),
        }
    }
}

/// Return the config of the first strategy that applies.
///
/// Missing or unrelated inputs make a strategy fall through to the next one;
/// only a kubeconfig positively identified as GKE can fail hard (bad CA data,
/// token refresh errors).
#[instrument(skip(sources, tokens))]
pub async fn resolve(sources: &CredentialSources, tokens: &dyn TokenSource) -> Result<ClusterConfig> {
    if let Some(config) = load_in_cluster(sources) {
        return Ok(config);
    }

    let file = sources.kubeconfig.as_deref().and_then(KubeconfigFile::load);
    if let Some(file) = &file {
        if let Some(config) = load_minikube(file) {
            return Ok(config);
        }
        if let Some(config) = load_gke(file, tokens).await? {
            return Ok(config);
        }
    }

    info!("No credential strategy matched");
    Err(KwatchError::NoUsableCredentials)
}
