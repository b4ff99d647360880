// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Ingress annotation keys read by the timeout reconciler
pub mod annotations {
    /// JSON list (or object keyed by name) of load-balancer backends, set by the GCE ingress controller
    pub const BACKENDS: &str = "ingress.kubernetes.io/backends";
    /// Desired backend timeout in seconds
    pub const TIMEOUT: &str = "ingress.kubernetes.io/pycon-demo-timeout";
}

/// Backend timeout bounds in seconds
pub mod timeouts {
    pub const DEFAULT_SECS: u32 = 30;
    /// Upper bound accepted by Compute Engine for backend services
    pub const MAX_SECS: u32 = 86_400;
}

/// Service account credentials mounted into every pod
pub mod in_cluster {
    pub const TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
    pub const CA_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";
    /// Set by the kubelet to the API server address
    pub const SERVER_ADDR_ENV: &str = "KUBERNETES_PORT_443_TCP_ADDR";
}

/// Markers identifying the kind of cluster a kubeconfig describes
pub mod kubeconfig {
    pub const MINIKUBE_CLUSTER: &str = "minikube";
    pub const GCP_AUTH_PROVIDER: &str = "gcp";
}

/// Google Cloud endpoints
pub mod gcp {
    pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
    pub const METADATA_TOKEN_URL: &str =
        "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
    pub const COMPUTE_URL: &str = "https://compute.googleapis.com/compute/v1";
    pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
    /// Relative to the home directory
    pub const ADC_PATH: &str = ".config/gcloud/application_default_credentials.json";
}

/// Resources watched by `kwatch watch` when none are given
pub const DEFAULT_WATCH_RESOURCES: &[&str] = &[
    "api/v1/namespaces",
    "api/v1/pods",
    "api/v1/services",
    "apis/batch/v1/jobs",
    "apis/apps/v1/daemonsets",
    "apis/apps/v1/statefulsets",
    "apis/apps/v1/deployments",
    "apis/networking.k8s.io/v1/ingresses",
];

pub const INGRESSES_PATH: &str = "apis/networking.k8s.io/v1/ingresses";
pub const NAMESPACES_PATH: &str = "api/v1/namespaces";
