// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session extraction and validation helpers for the HTTP layer.
//!
//! The server authenticates every request outside the `/auth` prefix by
//! resolving the session cookie to a stored session. This module holds the
//! pieces that do not touch the database: cookie parsing, the
//! authenticated-user context, and the authentication configuration.
//!
//! # Security Notes
//!
//! - Session identifiers are extracted from cookies (set HttpOnly by the
//!   login callback)
//! - Session values are never logged

use http::header::{AUTHORIZATION, COOKIE};
use http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::types::{SessionId, User};

/// Default name for the session cookie.
pub const SESSION_COOKIE_NAME: &str = "chime_session";

/// Environment variable to enable dev mode (bypass authentication).
pub const DEV_MODE_ENV_VAR: &str = "CHIME_SERVER_AUTH_DEV_MODE";
pub const CHIME_ENV_VAR: &str = "CHIME_SERVER_ENV";

/// The currently authenticated user, extracted from request context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
	/// The authenticated user.
	pub user: User,
	/// Session ID if authenticated via session cookie (absent in dev mode).
	pub session_id: Option<SessionId>,
}

impl CurrentUser {
	/// Create a new CurrentUser from a session-based authentication.
	pub fn from_session(user: User, session_id: SessionId) -> Self {
		Self {
			user,
			session_id: Some(session_id),
		}
	}

	/// Create a new CurrentUser for the dev-mode bypass user.
	pub fn dev(user: User) -> Self {
		Self {
			user,
			session_id: None,
		}
	}

	/// Returns true if authenticated via session cookie.
	pub fn is_session_auth(&self) -> bool {
		self.session_id.is_some()
	}
}

/// Configuration for authentication middleware.
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Enable dev mode (bypass authentication when CHIME_SERVER_AUTH_DEV_MODE=1).
	pub dev_mode: bool,
	/// Name of the session cookie.
	pub session_cookie_name: String,
	/// Session lifetime in seconds.
	pub session_ttl_secs: u64,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			dev_mode: false,
			session_cookie_name: SESSION_COOKIE_NAME.to_string(),
			session_ttl_secs: 7 * 24 * 60 * 60,
		}
	}
}

impl AuthConfig {
	/// Create a new AuthConfig with default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create AuthConfig from environment variables.
	///
	/// Reads `CHIME_SERVER_AUTH_DEV_MODE` to determine if dev mode should be
	/// enabled.
	///
	/// # Panics
	///
	/// Panics if both `CHIME_SERVER_AUTH_DEV_MODE=1` and
	/// `CHIME_SERVER_ENV=production` are set, as dev mode must never be
	/// enabled in production environments.
	pub fn from_env() -> Self {
		let dev_mode = std::env::var(DEV_MODE_ENV_VAR)
			.map(|v| v == "1" || v.to_lowercase() == "true")
			.unwrap_or(false);

		let chime_env = std::env::var(CHIME_ENV_VAR).unwrap_or_default();

		if dev_mode && chime_env.to_lowercase() == "production" {
			panic!(
				"FATAL: CHIME_SERVER_AUTH_DEV_MODE=1 is set while CHIME_SERVER_ENV=production. \
				 Dev mode authentication bypass MUST NOT be enabled in production. \
				 Remove CHIME_SERVER_AUTH_DEV_MODE or set CHIME_SERVER_ENV to a non-production value."
			);
		}

		Self {
			dev_mode,
			..Default::default()
		}
	}

	/// Set dev mode.
	pub fn with_dev_mode(mut self, enabled: bool) -> Self {
		self.dev_mode = enabled;
		self
	}

	/// Set the session cookie name.
	pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
		self.session_cookie_name = name.into();
		self
	}
}

/// Extract the session ID from the Cookie header.
///
/// Parses the Cookie header to find the cookie with the configured name
/// (default: `chime_session`).
pub fn extract_session_cookie_with_name(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get(COOKIE)?
		.to_str()
		.ok()?
		.split(';')
		.find_map(|cookie| {
			let cookie = cookie.trim();
			let (name, value) = cookie.split_once('=')?;

			if name == cookie_name {
				Some(value.to_string())
			} else {
				None
			}
		})
}

/// Extract a bearer token from the Authorization header.
///
/// Expects the format: `Authorization: Bearer <token>`
///
/// # Security
///
/// The returned token is a secret; never log it.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	let auth_header = headers.get(AUTHORIZATION)?;
	let auth_str = auth_header.to_str().ok()?;
	auth_str
		.strip_prefix("Bearer ")
		.map(|token| token.to_string())
}
