// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Google OAuth 2.0 sign-in client.
//!
//! Implements the authorization-code flow used by the dashboard's single
//! identity provider: build the consent URL, exchange the callback code for
//! tokens, and fetch the user's profile. CSRF state generation and session
//! creation are the caller's responsibility.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Result type for Google OAuth operations.
pub type Result<T> = std::result::Result<T, GoogleOAuthError>;

/// Errors that can occur during the OAuth flow.
#[derive(Debug, Error)]
pub enum GoogleOAuthError {
	#[error("http error: {0}")]
	Http(#[from] reqwest::Error),

	#[error("token exchange rejected: {0}")]
	TokenExchange(String),

	#[error("userinfo request rejected: {0}")]
	Userinfo(String),
}

/// Static configuration for the Google OAuth client.
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
	pub client_id: String,
	pub client_secret: String,
	/// Absolute callback URL registered with Google.
	pub redirect_url: String,
}

/// Profile claims returned by the userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
	/// Stable subject identifier for the Google account.
	pub sub: String,
	pub email: String,
	#[serde(default)]
	pub email_verified: bool,
	#[serde(default)]
	pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	access_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
	error: String,
	#[serde(default)]
	error_description: Option<String>,
}

/// Client for Google's OAuth 2.0 authorization-code flow.
#[derive(Debug, Clone)]
pub struct GoogleOAuthClient {
	config: GoogleOAuthConfig,
	http: reqwest::Client,
}

impl GoogleOAuthClient {
	pub fn new(config: GoogleOAuthConfig) -> Self {
		Self {
			config,
			http: reqwest::Client::new(),
		}
	}

	/// Build the consent URL the browser is redirected to.
	pub fn authorize_url(&self, state: &str) -> String {
		let url = Url::parse_with_params(
			AUTHORIZE_ENDPOINT,
			&[
				("client_id", self.config.client_id.as_str()),
				("redirect_uri", self.config.redirect_url.as_str()),
				("response_type", "code"),
				("scope", "openid email profile"),
				("state", state),
			],
		)
		.expect("authorize endpoint is a valid base URL");
		url.to_string()
	}

	/// Exchange a callback code for an access token.
	#[tracing::instrument(skip(self, code))]
	pub async fn exchange_code(&self, code: &str) -> Result<String> {
		let response = self
			.http
			.post(TOKEN_ENDPOINT)
			.form(&[
				("client_id", self.config.client_id.as_str()),
				("client_secret", self.config.client_secret.as_str()),
				("code", code),
				("grant_type", "authorization_code"),
				("redirect_uri", self.config.redirect_url.as_str()),
			])
			.send()
			.await?;

		if !response.status().is_success() {
			let err: ErrorResponse = response.json().await.unwrap_or(ErrorResponse {
				error: "unknown".to_string(),
				error_description: None,
			});
			tracing::warn!(error = %err.error, "Google token exchange failed");
			return Err(GoogleOAuthError::TokenExchange(
				err.error_description.unwrap_or(err.error),
			));
		}

		let token: TokenResponse = response.json().await?;
		Ok(token.access_token)
	}

	/// Fetch the signed-in user's profile claims.
	#[tracing::instrument(skip(self, access_token))]
	pub async fn fetch_userinfo(&self, access_token: &str) -> Result<GoogleUserInfo> {
		let response = self
			.http
			.get(USERINFO_ENDPOINT)
			.bearer_auth(access_token)
			.send()
			.await?;

		if !response.status().is_success() {
			let status = response.status();
			return Err(GoogleOAuthError::Userinfo(format!(
				"userinfo returned {}",
				status
			)));
		}

		Ok(response.json().await?)
	}
}
