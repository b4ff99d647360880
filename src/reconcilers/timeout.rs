// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Timeout reconciler - sets load-balancer backend timeouts from Ingress annotations.

use crate::cloud::BackendPatcher;
use crate::config::TimeoutSettings;
use crate::constants::annotations;
use crate::error::{KwatchError, Result};
use crate::kubernetes::WatchHandler;
use crate::types::{EventType, WatchEvent};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// One backend whose timeout should be set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTimeoutRequest {
    pub backend_id: String,
    pub timeout_secs: u32,
}

/// Stateless per event: the same MODIFIED event always yields the same patches
pub struct TimeoutReconciler<P> {
    patcher: P,
    project: String,
    settings: TimeoutSettings,
}

impl<P: BackendPatcher> TimeoutReconciler<P> {
    pub fn new(patcher: P, project: impl Into<String>, settings: TimeoutSettings) -> Self {
        Self {
            patcher,
            project: project.into(),
            settings,
        }
    }

    /// The patches an event asks for. Empty for anything but a MODIFIED
    /// ingress that already carries its backends annotation.
    pub fn plan(&self, event: &WatchEvent) -> Vec<BackendTimeoutRequest> {
        // New ingresses are modified several times while being provisioned
        if event.event_type != EventType::Modified {
            return Vec::new();
        }

        let object = event.object();
        let Some(raw_backends) = object.annotation(annotations::BACKENDS) else {
            debug!("No backends have been configured yet");
            return Vec::new();
        };
        let backends = match parse_backends(raw_backends) {
            Ok(b) => b,
            Err(e) => {
                warn!("Skipping event: {}", e);
                return Vec::new();
            }
        };

        let timeout_secs = parse_timeout(object.annotation(&self.settings.annotation), &self.settings);
        backends
            .into_iter()
            .map(|backend_id| BackendTimeoutRequest {
                backend_id,
                timeout_secs,
            })
            .collect()
    }

    /// Patch every backend the event names. Returns how many patches succeeded;
    /// a failing backend is logged and skipped.
    #[instrument(skip(self, event), fields(ingress = %event.object().name().unwrap_or("<None>")))]
    pub async fn on_ingress_event(&self, event: &WatchEvent) -> usize {
        let mut patched = 0;
        for request in self.plan(event) {
            info!(
                "Updating timeout for <{}> to {}s",
                request.backend_id, request.timeout_secs
            );
            match self
                .patcher
                .patch_timeout(&self.project, &request.backend_id, request.timeout_secs)
                .await
            {
                Ok(()) => patched += 1,
                Err(e) => warn!("Ignored failed update of <{}>: {}", request.backend_id, e),
            }
        }
        patched
    }
}

#[async_trait]
impl<P: BackendPatcher> WatchHandler for TimeoutReconciler<P> {
    async fn handle(&mut self, event: WatchEvent) {
        let object = event.object();
        info!(
            "{} {} {}",
            event.event_type,
            object.namespace().unwrap_or("<Unknown>"),
            object.name().unwrap_or("<None>")
        );
        self.on_ingress_event(&event).await;
    }
}

/// Timeout in seconds from the annotation value. Missing, empty, non-numeric,
/// zero or negative values give the default; large values are capped at the maximum.
pub fn parse_timeout(value: Option<&str>, settings: &TimeoutSettings) -> u32 {
    match value.map(str::trim).and_then(|v| v.parse::<u64>().ok()) {
        Some(secs) if secs > 0 => {
            u32::try_from(secs.min(u64::from(settings.max_secs))).unwrap_or(settings.max_secs)
        }
        _ => settings.default_secs,
    }
}

/// Backend names from the backends annotation: a JSON list of names, or an
/// object keyed by name (the GCE ingress controller's health map)
pub fn parse_backends(raw: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        KwatchError::InvalidAnnotation(format!("{} is not JSON: {}", annotations::BACKENDS, e))
    })?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(name) => Ok(name),
                other => Err(KwatchError::InvalidAnnotation(format!(
                    "{} contains a non-string entry: {}",
                    annotations::BACKENDS,
                    other
                ))),
            })
            .collect(),
        Value::Object(map) => Ok(map.into_iter().map(|(name, _)| name).collect()),
        other => Err(KwatchError::InvalidAnnotation(format!(
            "{} must be a list or an object, got {}",
            annotations::BACKENDS,
            other
        ))),
    }
}
