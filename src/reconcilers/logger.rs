// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Event logger - reports every change of a watched resource.

use crate::kubernetes::WatchHandler;
use crate::types::WatchEvent;
use async_trait::async_trait;
use tracing::info;

/// Logs `TYPE Kind NAMESPACE name` for every event and counts them
#[derive(Debug, Default)]
pub struct EventLogger {
    pub seen: usize,
}

impl EventLogger {
    pub fn describe(event: &WatchEvent) -> String {
        let object = event.object();
        format!(
            "{} {} {} {}",
            event.event_type,
            object.kind().unwrap_or("<Unknown>"),
            object.namespace().unwrap_or("<Unknown>").to_uppercase(),
            object.name().unwrap_or("<None>")
        )
    }
}

#[async_trait]
impl WatchHandler for EventLogger {
    async fn handle(&mut self, event: WatchEvent) {
        self.seen += 1;
        info!("{}", Self::describe(&event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(object: serde_json::Value) -> WatchEvent {
        serde_json::from_value(json!({ "type": "ADDED", "object": object })).unwrap()
    }

    #[test]
    fn test_describe_namespaced() {
        let e = event(json!({ "kind": "Pod", "metadata": { "name": "web-0", "namespace": "prod" } }));
        assert_eq!(EventLogger::describe(&e), "ADDED Pod PROD web-0");
    }

    #[test]
    fn test_describe_cluster_scoped() {
        let e = event(json!({ "kind": "Namespace", "metadata": { "name": "prod" } }));
        assert_eq!(EventLogger::describe(&e), "ADDED Namespace <UNKNOWN> prod");
    }

    #[tokio::test]
    async fn test_counts_events() {
        let mut logger = EventLogger::default();
        logger.handle(event(json!({ "metadata": {} }))).await;
        logger.handle(event(json!({ "metadata": {} }))).await;
        assert_eq!(logger.seen, 2);
    }
}
