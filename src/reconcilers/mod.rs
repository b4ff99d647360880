// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Watch handlers that react to streamed events.

pub mod logger;
pub mod timeout;

pub use logger::EventLogger;
pub use timeout::{BackendTimeoutRequest, TimeoutReconciler};
