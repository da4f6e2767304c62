// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication types and session helpers for the Chime server.
//!
//! This crate defines the user and session model plus the request-side
//! helpers the HTTP layer uses to extract and validate session cookies.
//! Persistence of users and sessions lives in `chime-server-db`; the
//! OAuth provider client lives in `chime-server-auth-google`.

pub mod middleware;
pub mod types;

pub use middleware::{
	extract_bearer_token, extract_session_cookie_with_name, AuthConfig, CurrentUser,
	SESSION_COOKIE_NAME,
};
pub use types::{Session, SessionId, User, UserId};
