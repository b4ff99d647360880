// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Kind of change reported by a watch stream
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Added,
    Modified,
    Deleted,
    Error,
    Bookmark,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventType::Added => "ADDED",
            EventType::Modified => "MODIFIED",
            EventType::Deleted => "DELETED",
            EventType::Error => "ERROR",
            EventType::Bookmark => "BOOKMARK",
        };
        f.write_str(s)
    }
}

/// One line of a watch stream
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct WatchEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub object: Value,
}

impl WatchEvent {
    pub fn object(&self) -> ResourceView<'_> {
        ResourceView(&self.object)
    }
}

/// Read-only accessors over an untyped resource document
#[derive(Clone, Copy, Debug)]
pub struct ResourceView<'a>(pub &'a Value);

impl<'a> ResourceView<'a> {
    pub fn kind(&self) -> Option<&'a str> {
        self.0.get("kind").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&'a str> {
        self.metadata_str("name")
    }

    pub fn namespace(&self) -> Option<&'a str> {
        self.metadata_str("namespace")
    }

    /// Value of `metadata.annotations[key]`, if it is a string
    pub fn annotation(&self, key: &str) -> Option<&'a str> {
        self.0
            .pointer("/metadata/annotations")
            .and_then(|a| a.get(key))
            .and_then(Value::as_str)
    }

    fn metadata_str(&self, field: &str) -> Option<&'a str> {
        self.0
            .get("metadata")
            .and_then(|m| m.get(field))
            .and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_modified_event() {
        let line = r#"{"type":"MODIFIED","object":{"kind":"Ingress","metadata":{"name":"web","namespace":"prod"}}}"#;
        let event: WatchEvent = serde_json::from_str(line).unwrap();

        assert_eq!(event.event_type, EventType::Modified);
        assert_eq!(event.object().kind(), Some("Ingress"));
        assert_eq!(event.object().name(), Some("web"));
        assert_eq!(event.object().namespace(), Some("prod"));
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        let line = r#"{"type":"RENAMED","object":{}}"#;
        assert!(serde_json::from_str::<WatchEvent>(line).is_err());
    }

    #[test]
    fn test_missing_object_rejected() {
        assert!(serde_json::from_str::<WatchEvent>(r#"{"type":"ADDED"}"#).is_err());
    }

    #[test]
    fn test_annotation_lookup() {
        let object = json!({
            "metadata": {
                "name": "web",
                "annotations": { "a": "1", "n": 5 }
            }
        });
        let view = ResourceView(&object);

        assert_eq!(view.annotation("a"), Some("1"));
        assert_eq!(view.annotation("n"), None);
        assert_eq!(view.annotation("missing"), None);
        assert_eq!(view.namespace(), None);
    }

    #[test]
    fn test_annotation_lookup_without_metadata() {
        let object = json!({ "kind": "Status" });
        assert_eq!(ResourceView(&object).annotation("a"), None);
        assert_eq!(ResourceView(&object).name(), None);
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!(EventType::Modified.to_string(), "MODIFIED");
        assert_eq!(EventType::Error.to_string(), "ERROR");
    }
}
