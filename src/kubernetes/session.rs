// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Authenticated HTTP sessions against the API server, async and blocking.

use crate::error::{KwatchError, Result};
use crate::kubernetes::watch::{watch, WatchHandler};
use crate::types::{Auth, ClusterConfig};
use http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument};
use url::Url;

const CONTEXT_NAME: &str = "kwatch";

/// One client with the CA, bearer token or client certificate of a `ClusterConfig` attached.
/// Connections are released when the session is dropped.
pub struct Session {
    client: Client,
}

impl Session {
    /// Wrap an existing client, e.g. one backed by a mock service
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    #[instrument(skip(config), fields(server = %config.base_url()))]
    pub async fn connect(config: &ClusterConfig) -> Result<Self> {
        let client = Client::try_from(client_config(config).await?)?;
        debug!("Session established");
        Ok(Self { client })
    }

    /// GET `uri` and fail with `ConnectionError` unless the server answers 200
    pub async fn get(&self, uri: &str) -> Result<Response<Body>> {
        let request = Request::get(uri)
            .body(Body::empty())
            .map_err(|e| KwatchError::RequestError(format!("Invalid request {}: {}", uri, e)))?;
        let response = self.client.send(request).await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = match response.into_body().collect().await {
                Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
                Err(e) => format!("<unreadable body: {}>", e),
            };
            return Err(KwatchError::ConnectionError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// One-shot listing of a collection, returning its `items`
    #[instrument(skip(self))]
    pub async fn list(&self, resource_path: &str) -> Result<Vec<Value>> {
        let response = self.get(&resource_uri(resource_path)).await?;
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| KwatchError::StreamError(e.to_string()))?
            .to_bytes();

        let mut document: Value = serde_json::from_slice(&bytes).map_err(|e| {
            KwatchError::StreamError(format!("Invalid list response for {}: {}", resource_path, e))
        })?;
        let items = match document.get_mut("items").map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        info!("Listed {} items from {}", items.len(), resource_path);
        Ok(items)
    }
}

/// Synchronous session driving its own single-threaded runtime.
/// Must not be used from inside another tokio runtime.
pub struct BlockingSession {
    // Dropped before the runtime it was created on
    session: Session,
    runtime: tokio::runtime::Runtime,
}

impl BlockingSession {
    pub fn connect(config: &ClusterConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let session = runtime.block_on(Session::connect(config))?;
        Ok(Self { session, runtime })
    }

    /// Pair a session with the runtime its client was created on
    pub fn from_parts(runtime: tokio::runtime::Runtime, session: Session) -> Self {
        Self { session, runtime }
    }

    pub fn list(&self, resource_path: &str) -> Result<Vec<Value>> {
        self.runtime.block_on(self.session.list(resource_path))
    }

    pub fn watch<H: WatchHandler + ?Sized>(&self, resource_path: &str, handler: &mut H) -> Result<usize> {
        self.runtime
            .block_on(watch(&self.session, resource_path, handler))
    }
}

/// Client configuration for `config`, without a read timeout: watch bodies
/// may stay idle for as long as the watched resource does not change.
pub async fn client_config(config: &ClusterConfig) -> Result<kube::Config> {
    let kubeconfig: Kubeconfig = serde_json::from_value(kubeconfig_document(config)?)
        .map_err(|e| KwatchError::KubeconfigError(format!("Failed to build kubeconfig: {}", e)))?;

    let mut client_config =
        kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| KwatchError::KubeconfigError(format!("Failed to create config: {}", e)))?;
    client_config.read_timeout = None;
    Ok(client_config)
}

/// Absolute request path for a resource given relative to the API root
pub fn resource_uri(resource_path: &str) -> String {
    format!("/{}", resource_path.trim_start_matches('/'))
}

/// A single-context kubeconfig equivalent to `config`
pub fn kubeconfig_document(config: &ClusterConfig) -> Result<Value> {
    Url::parse(config.base_url()).map_err(|e| {
        KwatchError::KubeconfigError(format!("Invalid server URL {}: {}", config.base_url(), e))
    })?;

    let mut user = Map::new();
    match config.auth() {
        Auth::Token(token) => {
            user.insert("token".to_string(), json!(token));
        }
        Auth::ClientCert(cert) => {
            user.insert(
                "client-certificate".to_string(),
                json!(cert.cert_path.to_string_lossy()),
            );
            user.insert(
                "client-key".to_string(),
                json!(cert.key_path.to_string_lossy()),
            );
        }
        Auth::Anonymous => {}
    }

    Ok(json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{
            "name": CONTEXT_NAME,
            "cluster": {
                "server": config.base_url(),
                "certificate-authority": config.ca_cert_path().to_string_lossy(),
            }
        }],
        "users": [{ "name": CONTEXT_NAME, "user": user }],
        "contexts": [{
            "name": CONTEXT_NAME,
            "context": { "cluster": CONTEXT_NAME, "user": CONTEXT_NAME }
        }],
        "current-context": CONTEXT_NAME,
    }))
}
