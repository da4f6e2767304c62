// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Chime job dashboard server.
//!
//! This crate provides the HTTP server for the Chime dashboard: session-
//! gated project/job/log APIs backed by SQLite, Google OAuth sign-in, and
//! the report endpoint the external job executor calls after each run.

pub mod api;
pub mod api_docs;
pub mod api_response;
pub mod auth_middleware;
pub mod jobs;
pub mod oauth_state;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
pub use api_docs::ApiDoc;
pub use chime_server_config::ServerConfig;
pub use oauth_state::OAuthStateStore;
