// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Core data types shared by the resolver, the watch consumer and the reconcilers.

pub mod cluster_config;
pub mod watch_event;

pub use cluster_config::{Auth, ClientCert, ClusterConfig};
pub use watch_event::{EventType, ResourceView, WatchEvent};
