// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! API server sessions and watch stream consumption.

pub mod session;
pub mod watch;

pub use session::{BlockingSession, Session};
pub use watch::{watch, watch_concurrently, watch_concurrently_fail_fast, WatchHandler, WatchTask};
