// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Google Cloud access: OAuth tokens and backend-service patching.

pub mod auth;
pub mod backend_services;

pub use auth::{GoogleTokenSource, TokenSource};
pub use backend_services::{BackendPatcher, ComputeBackendServices};
