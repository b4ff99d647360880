// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubeconfig-based strategies: minikube client certificates and GKE OAuth.

use crate::cloud::TokenSource;
use crate::constants::kubeconfig::{GCP_AUTH_PROVIDER, MINIKUBE_CLUSTER};
use crate::error::{KwatchError, Result};
use crate::types::{Auth, ClientCert, ClusterConfig};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The subset of a kubeconfig file the strategies look at
#[derive(Deserialize, Debug, Default)]
pub struct KubeconfigFile {
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
}

#[derive(Deserialize, Debug, Default)]
pub struct NamedCluster {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cluster: ClusterEntry,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterEntry {
    pub server: Option<String>,
    pub certificate_authority: Option<String>,
    pub certificate_authority_data: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct NamedUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user: UserEntry,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct UserEntry {
    pub client_certificate: Option<String>,
    pub client_key: Option<String>,
    pub auth_provider: Option<AuthProvider>,
}

#[derive(Deserialize, Debug, Default)]
pub struct AuthProvider {
    #[serde(default)]
    pub name: String,
}

impl KubeconfigFile {
    /// Read and parse a kubeconfig; `None` when it is missing or malformed
    pub fn load(path: &Path) -> Option<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                debug!("Cannot read kubeconfig {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_yaml::from_str(&contents) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("Ignoring malformed kubeconfig {}: {}", path.display(), e);
                None
            }
        }
    }

    /// The only cluster and user in the file. Multi-cluster files are not supported.
    pub fn single_entry(&self) -> Option<(&NamedCluster, &NamedUser)> {
        match (self.clusters.as_slice(), self.users.as_slice()) {
            ([cluster], [user]) => Some((cluster, user)),
            ([], _) | (_, []) => None,
            _ => {
                warn!(
                    "Kubeconfig describes {} clusters and {} users, expected exactly one of each",
                    self.clusters.len(),
                    self.users.len()
                );
                None
            }
        }
    }
}

/// Client-certificate config for a local minikube cluster
pub fn load_minikube(file: &KubeconfigFile) -> Option<ClusterConfig> {
    let (cluster, user) = file.single_entry()?;
    if cluster.name != MINIKUBE_CLUSTER {
        return None;
    }

    let entry = &cluster.cluster;
    let (Some(server), Some(ca)) = (&entry.server, &entry.certificate_authority) else {
        debug!("Minikube cluster entry lacks server or certificate-authority");
        return None;
    };
    let (Some(cert), Some(key)) = (&user.user.client_certificate, &user.user.client_key) else {
        debug!("Minikube user entry lacks client-certificate or client-key");
        return None;
    };

    info!("Using minikube client certificate for {}", server);
    Some(ClusterConfig::new(
        server.clone(),
        PathBuf::from(ca),
        Auth::ClientCert(ClientCert {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        }),
    ))
}

/// Bearer-token config for a GKE cluster, refreshing the token through `tokens`
pub async fn load_gke(file: &KubeconfigFile, tokens: &dyn TokenSource) -> Result<Option<ClusterConfig>> {
    let Some((cluster, user)) = file.single_entry() else {
        return Ok(None);
    };
    let is_gcp = user
        .user
        .auth_provider
        .as_ref()
        .is_some_and(|p| p.name == GCP_AUTH_PROVIDER);
    if !is_gcp {
        return Ok(None);
    }

    let entry = &cluster.cluster;
    let (Some(server), Some(ca_data)) = (&entry.server, &entry.certificate_authority_data) else {
        debug!("GKE cluster entry lacks server or certificate-authority-data");
        return Ok(None);
    };

    // GKE signs the API server certificate with a private CA; the HTTP layer wants it as a file
    let ca_pem = STANDARD.decode(ca_data.trim()).map_err(|e| {
        KwatchError::KubeconfigError(format!(
            "Invalid certificate-authority-data for cluster {}: {}",
            cluster.name, e
        ))
    })?;
    let mut ca_file = tempfile::Builder::new()
        .prefix("kwatch-ca-")
        .suffix(".crt")
        .tempfile()?;
    ca_file.write_all(&ca_pem)?;
    ca_file.flush()?;

    let token = tokens.access_token().await?;

    info!("Using GKE OAuth token for {}", server);
    Ok(Some(ClusterConfig::with_temp_ca(
        server.clone(),
        ca_file.into_temp_path(),
        Auth::Token(token),
    )))
}
