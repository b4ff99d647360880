// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking the API server, Google Cloud and watch handlers.

use crate::cloud::{BackendPatcher, TokenSource};
use crate::error::{KwatchError, Result as KwatchResult};
use crate::kubernetes::WatchHandler;
use crate::types::{ResourceView, WatchEvent};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path (query ignored)
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(("GET".to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Path and query of every request received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service. Needs a tokio runtime context.
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.to_string())
            .unwrap_or_else(|| path.clone());
        self.requests.lock().unwrap().push(path_and_query);

        let response = self.responses.lock().unwrap().get(&(method, path)).cloned();

        Box::pin(async move {
            let (status, body) = response.unwrap_or_else(|| {
                (
                    404,
                    r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#
                        .to_string(),
                )
            });
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Token source returning a fixed token (or always failing) and counting calls
pub struct StaticTokenSource {
    token: Option<String>,
    calls: AtomicUsize,
}

impl StaticTokenSource {
    pub fn new(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            token: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> KwatchResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token
            .clone()
            .ok_or_else(|| KwatchError::TokenRefreshError("invalid_grant".to_string()))
    }
}

/// Backend patcher recording every call; backends in `failing` return an error
#[derive(Clone, Default)]
pub struct RecordingPatcher {
    calls: Arc<Mutex<Vec<(String, String, u32)>>>,
    failing: HashSet<String>,
}

impl RecordingPatcher {
    pub fn failing_on(backends: &[&str]) -> Self {
        Self {
            calls: Arc::default(),
            failing: backends.iter().map(|b| b.to_string()).collect(),
        }
    }

    /// `(project, backend, timeout)` in call order
    pub fn calls(&self) -> Vec<(String, String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendPatcher for RecordingPatcher {
    async fn patch_timeout(&self, project: &str, backend: &str, timeout_secs: u32) -> KwatchResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((project.to_string(), backend.to_string(), timeout_secs));
        if self.failing.contains(backend) {
            return Err(KwatchError::BackendPatchError(format!("{}: 404 Not Found", backend)));
        }
        Ok(())
    }
}

/// Watch handler keeping every event it receives
#[derive(Default)]
pub struct RecordingHandler {
    pub events: Vec<WatchEvent>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl RecordingHandler {
    pub fn names(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| e.object().name().unwrap_or_default().to_string())
            .collect()
    }

    /// Names seen by this handler, readable after it was moved into a task
    pub fn shared(&self) -> Arc<Mutex<Vec<String>>> {
        self.seen.clone()
    }
}

#[async_trait]
impl WatchHandler for RecordingHandler {
    async fn handle(&mut self, event: WatchEvent) {
        let name = ResourceView(&event.object).name().unwrap_or_default().to_string();
        self.seen.lock().unwrap().push(name);
        self.events.push(event);
    }
}

/// Write `contents` to `dir/name` and return the path
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// A serialized watch event for a ConfigMap named `name`
pub fn event_line(event_type: &str, name: &str) -> String {
    serde_json::json!({
        "type": event_type,
        "object": {
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": { "name": name, "namespace": "default" }
        }
    })
    .to_string()
}

/// A watch event carrying an Ingress with the given annotations
pub fn ingress_event(event_type: &str, annotations: &[(&str, &str)]) -> WatchEvent {
    let ingress = Ingress {
        metadata: ObjectMeta {
            name: Some("web".to_string()),
            namespace: Some("default".to_string()),
            annotations: Some(
                annotations
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            ..Default::default()
        },
        ..Default::default()
    };

    serde_json::from_value(serde_json::json!({
        "type": event_type,
        "object": ingress,
    }))
    .unwrap()
}

/// A namespace list response
pub fn namespace_list_json(names: &[&str]) -> String {
    let items: Vec<_> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "apiVersion": "v1",
                "kind": "Namespace",
                "metadata": { "name": name, "uid": "test-uid" }
            })
        })
        .collect();

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "NamespaceList",
        "metadata": {},
        "items": items
    })
    .to_string()
}
