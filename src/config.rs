// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{annotations, timeouts};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Kubeconfig consulted when not running inside a pod
    pub kubeconfig: Option<PathBuf>,
    /// Google Cloud project owning the load-balancer backends
    pub gcloud_project: Option<String>,
    pub timeout: TimeoutSettings,
}

/// How the reconciler turns the timeout annotation into seconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutSettings {
    pub annotation: String,
    pub default_secs: u32,
    pub max_secs: u32,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            annotation: annotations::TIMEOUT.to_string(),
            default_secs: timeouts::DEFAULT_SECS,
            max_secs: timeouts::MAX_SECS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let kubeconfig = env::var_os("KUBECONFIG").map(PathBuf::from);
        let gcloud_project = env::var("GCLOUD_PROJECT").ok().filter(|p| !p.is_empty());

        let mut timeout = TimeoutSettings::default();
        if let Ok(annotation) = env::var("KWATCH_TIMEOUT_ANNOTATION") {
            timeout.annotation = annotation;
        }
        if let Ok(value) = env::var("KWATCH_DEFAULT_TIMEOUT") {
            timeout.default_secs = value
                .parse()
                .context("KWATCH_DEFAULT_TIMEOUT must be a positive integer")?;
        }
        if let Ok(value) = env::var("KWATCH_MAX_TIMEOUT") {
            timeout.max_secs = value
                .parse()
                .context("KWATCH_MAX_TIMEOUT must be a positive integer")?;
        }
        anyhow::ensure!(
            timeout.default_secs > 0 && timeout.default_secs <= timeout.max_secs,
            "default timeout {} must be between 1 and the maximum {}",
            timeout.default_secs,
            timeout.max_secs
        );

        Ok(Config {
            kubeconfig,
            gcloud_project,
            timeout,
        })
    }

    /// The configured project, or an error naming the variable to set
    pub fn require_project(&self) -> Result<&str> {
        self.gcloud_project
            .as_deref()
            .context("GCLOUD_PROJECT environment variable not set")
    }
}
