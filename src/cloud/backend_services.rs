// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Compute Engine backend services: the load-balancer targets whose timeout we adjust.

use crate::cloud::auth::TokenSource;
use crate::constants::gcp;
use crate::error::{KwatchError, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Remote capability: set the timeout of one backend service
#[async_trait]
pub trait BackendPatcher: Send + Sync {
    async fn patch_timeout(&self, project: &str, backend: &str, timeout_secs: u32) -> Result<()>;
}

/// `BackendPatcher` backed by the Compute Engine REST API
pub struct ComputeBackendServices {
    http: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    endpoint: String,
}

impl ComputeBackendServices {
    pub fn new(http: reqwest::Client, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http,
            tokens,
            endpoint: gcp::COMPUTE_URL.to_string(),
        }
    }

    pub fn backend_url(&self, project: &str, backend: &str) -> String {
        format!(
            "{}/projects/{}/global/backendServices/{}",
            self.endpoint.trim_end_matches('/'),
            project,
            backend
        )
    }
}

#[async_trait]
impl BackendPatcher for ComputeBackendServices {
    #[instrument(skip(self))]
    async fn patch_timeout(&self, project: &str, backend: &str, timeout_secs: u32) -> Result<()> {
        let token = self.tokens.access_token().await?;
        let url = self.backend_url(project, backend);

        debug!("PATCH {}", url);
        let response = self
            .http
            .patch(&url)
            .bearer_auth(token)
            .json(&json!({ "timeoutSec": timeout_secs }))
            .send()
            .await
            .map_err(|e| KwatchError::BackendPatchError(format!("{}: {}", backend, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KwatchError::BackendPatchError(format!(
                "{} returned {}: {}",
                backend, status, body
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::StaticTokenSource;

    #[test]
    fn test_backend_url() {
        let services = ComputeBackendServices::new(
            reqwest::Client::new(),
            Arc::new(StaticTokenSource::new("t")),
        );

        assert_eq!(
            services.backend_url("demo-project", "k8s-be-30080--abc"),
            "https://compute.googleapis.com/compute/v1/projects/demo-project/global/backendServices/k8s-be-30080--abc"
        );
    }

    #[tokio::test]
    async fn test_token_failure_surfaces_before_request() {
        let services = ComputeBackendServices::new(
            reqwest::Client::new(),
            Arc::new(StaticTokenSource::failing()),
        );

        let result = services.patch_timeout("p", "b", 30).await;
        assert!(matches!(result, Err(KwatchError::TokenRefreshError(_))));
    }
}
