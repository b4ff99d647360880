// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KwatchError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("No usable credentials found (tried in-cluster, minikube and GKE)")]
    NoUsableCredentials,

    #[error("Request failed with status {status}: {body}")]
    ConnectionError { status: u16, body: String },

    #[error("Malformed watch event on line {line}: {source}")]
    MalformedEvent {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid request: {0}")]
    RequestError(String),

    #[error("Response stream failed: {0}")]
    StreamError(String),

    #[error("Token refresh failed: {0}")]
    TokenRefreshError(String),

    #[error("Backend patch failed: {0}")]
    BackendPatchError(String),

    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KwatchError>;
