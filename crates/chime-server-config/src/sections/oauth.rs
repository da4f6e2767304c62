// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OAuth provider configuration.

use serde::Deserialize;

/// OAuth configuration (runtime, fully resolved).
///
/// A provider is configured only when both its client id and secret are
/// present; otherwise its login route answers 501.
#[derive(Debug, Clone, Default)]
pub struct OAuthConfig {
	pub google: Option<GoogleOAuthSettings>,
}

/// Google OAuth settings.
#[derive(Debug, Clone)]
pub struct GoogleOAuthSettings {
	pub client_id: String,
	pub client_secret: String,
	/// Callback path appended to the server's base URL.
	pub redirect_path: String,
}

/// OAuth configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthConfigLayer {
	#[serde(default)]
	pub google: Option<GoogleOAuthConfigLayer>,
}

/// Google OAuth configuration layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleOAuthConfigLayer {
	#[serde(default)]
	pub client_id: Option<String>,
	#[serde(default)]
	pub client_secret: Option<String>,
	#[serde(default)]
	pub redirect_path: Option<String>,
}

impl OAuthConfigLayer {
	pub fn merge(&mut self, other: OAuthConfigLayer) {
		match (&mut self.google, other.google) {
			(Some(mine), Some(theirs)) => mine.merge(theirs),
			(slot @ None, Some(theirs)) => *slot = Some(theirs),
			_ => {}
		}
	}

	pub fn finalize(self) -> OAuthConfig {
		OAuthConfig {
			google: self.google.and_then(GoogleOAuthConfigLayer::finalize),
		}
	}
}

impl GoogleOAuthConfigLayer {
	pub fn merge(&mut self, other: GoogleOAuthConfigLayer) {
		if other.client_id.is_some() {
			self.client_id = other.client_id;
		}
		if other.client_secret.is_some() {
			self.client_secret = other.client_secret;
		}
		if other.redirect_path.is_some() {
			self.redirect_path = other.redirect_path;
		}
	}

	pub fn finalize(self) -> Option<GoogleOAuthSettings> {
		match (self.client_id, self.client_secret) {
			(Some(client_id), Some(client_secret))
				if !client_id.is_empty() && !client_secret.is_empty() =>
			{
				Some(GoogleOAuthSettings {
					client_id,
					client_secret,
					redirect_path: self
						.redirect_path
						.unwrap_or_else(|| "/auth/google/callback".to_string()),
				})
			}
			_ => None,
		}
	}
}
