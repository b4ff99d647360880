// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Service account credentials of the pod we run in.

use crate::credentials::CredentialSources;
use crate::types::{Auth, ClusterConfig};
use tracing::{debug, info};

/// Bearer-token config from the mounted service account, if we are inside a pod
pub fn load_in_cluster(sources: &CredentialSources) -> Option<ClusterConfig> {
    let Some(server_addr) = sources.server_addr.as_deref().filter(|a| !a.is_empty()) else {
        debug!("API server address not set, not running in a pod");
        return None;
    };
    if !sources.ca_path.exists() {
        debug!("Service account CA {} not found", sources.ca_path.display());
        return None;
    }

    let token = match std::fs::read_to_string(&sources.token_path) {
        Ok(t) => t.trim_end().to_string(),
        Err(e) => {
            debug!(
                "Service account token {} unreadable: {}",
                sources.token_path.display(),
                e
            );
            return None;
        }
    };

    info!("Using in-cluster service account credentials");
    Some(ClusterConfig::new(
        format!("https://{}", server_addr),
        sources.ca_path.clone(),
        Auth::Token(token),
    ))
}
