// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and session configuration.

use serde::Deserialize;

/// Auth configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Bypass authentication entirely (development only).
	pub dev_mode: bool,
	/// Deployment environment name ("development", "production", ...).
	pub environment: String,
	/// Session lifetime in seconds.
	pub session_ttl_secs: u64,
	/// How often expired sessions are swept, in seconds.
	pub session_cleanup_interval_secs: u64,
	/// Bearer token the external executor presents on report calls.
	pub executor_token: Option<String>,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			dev_mode: false,
			environment: "development".to_string(),
			session_ttl_secs: 7 * 24 * 60 * 60,
			session_cleanup_interval_secs: 60 * 60,
			executor_token: None,
		}
	}
}

/// Auth configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub dev_mode: Option<bool>,
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub session_ttl_secs: Option<u64>,
	#[serde(default)]
	pub session_cleanup_interval_secs: Option<u64>,
	#[serde(default)]
	pub executor_token: Option<String>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.dev_mode.is_some() {
			self.dev_mode = other.dev_mode;
		}
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.session_ttl_secs.is_some() {
			self.session_ttl_secs = other.session_ttl_secs;
		}
		if other.session_cleanup_interval_secs.is_some() {
			self.session_cleanup_interval_secs = other.session_cleanup_interval_secs;
		}
		if other.executor_token.is_some() {
			self.executor_token = other.executor_token;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		let defaults = AuthConfig::default();
		AuthConfig {
			dev_mode: self.dev_mode.unwrap_or(defaults.dev_mode),
			environment: self.environment.unwrap_or(defaults.environment),
			session_ttl_secs: self.session_ttl_secs.unwrap_or(defaults.session_ttl_secs),
			session_cleanup_interval_secs: self
				.session_cleanup_interval_secs
				.unwrap_or(defaults.session_cleanup_interval_secs),
			executor_token: self.executor_token,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = AuthConfigLayer::default().finalize();
		assert!(!config.dev_mode);
		assert_eq!(config.environment, "development");
		assert_eq!(config.session_ttl_secs, 604_800);
		assert!(config.executor_token.is_none());
	}

	#[test]
	fn test_merge_keeps_later_values() {
		let mut base = AuthConfigLayer {
			dev_mode: Some(false),
			..Default::default()
		};
		base.merge(AuthConfigLayer {
			dev_mode: Some(true),
			executor_token: Some("tok".to_string()),
			..Default::default()
		});
		let config = base.finalize();
		assert!(config.dev_mode);
		assert_eq!(config.executor_token.as_deref(), Some("tok"));
	}
}
