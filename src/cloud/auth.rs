// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Google OAuth access tokens from application default credentials.

use crate::constants::gcp;
use crate::error::{KwatchError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Something that can hand out a fresh OAuth access token
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Contents of an application default credentials file
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdcFile {
    AuthorizedUser {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
    ServiceAccount {
        #[serde(default)]
        client_email: String,
    },
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
}

/// Token source following Google's application default credentials lookup:
/// an explicit credentials file, then the gcloud user file, then the GCE metadata server.
pub struct GoogleTokenSource {
    http: reqwest::Client,
    credentials_path: Option<PathBuf>,
    token_url: String,
    metadata_url: String,
}

impl GoogleTokenSource {
    pub fn new(http: reqwest::Client, credentials_path: Option<PathBuf>) -> Self {
        Self {
            http,
            credentials_path,
            token_url: gcp::TOKEN_URL.to_string(),
            metadata_url: gcp::METADATA_TOKEN_URL.to_string(),
        }
    }

    /// Locate credentials via `GOOGLE_APPLICATION_CREDENTIALS` or the gcloud default path
    pub fn from_env(http: reqwest::Client) -> Self {
        let explicit = std::env::var_os(gcp::CREDENTIALS_ENV).map(PathBuf::from);
        let credentials_path = explicit.or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(gcp::ADC_PATH))
                .filter(|p| p.exists())
        });
        Self::new(http, credentials_path)
    }

    async fn refresh_user_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<String> {
        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(token_error)?;
        read_token(response).await
    }

    async fn metadata_token(&self) -> Result<String> {
        let response = self
            .http
            .get(&self.metadata_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(token_error)?;
        read_token(response).await
    }
}

#[async_trait]
impl TokenSource for GoogleTokenSource {
    #[instrument(skip(self))]
    async fn access_token(&self) -> Result<String> {
        let Some(path) = &self.credentials_path else {
            debug!("No application default credentials file, asking the metadata server");
            return self.metadata_token().await;
        };

        match read_adc_file(path)? {
            AdcFile::AuthorizedUser {
                client_id,
                client_secret,
                refresh_token,
            } => {
                info!("Refreshing OAuth token for gcloud user credentials");
                self.refresh_user_token(&client_id, &client_secret, &refresh_token)
                    .await
            }
            AdcFile::ServiceAccount { client_email } => Err(KwatchError::TokenRefreshError(format!(
                "service account key files are not supported ({}); use gcloud user credentials or the metadata server",
                client_email
            ))),
        }
    }
}

/// Parse an application default credentials file
pub fn read_adc_file(path: &Path) -> Result<AdcFile> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        KwatchError::TokenRefreshError(format!("Cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        KwatchError::TokenRefreshError(format!("Cannot parse {}: {}", path.display(), e))
    })
}

async fn read_token(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(KwatchError::TokenRefreshError(format!(
            "token endpoint returned {}: {}",
            status, body
        )));
    }
    let token: TokenResponse = response.json().await.map_err(token_error)?;
    Ok(token.access_token)
}

fn token_error(e: reqwest::Error) -> KwatchError {
    KwatchError::TokenRefreshError(e.to_string())
}
