// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Integration tests for authentication routes.
//!
//! Tests cover:
//! - OAuth login/callback behavior with and without a configured provider
//! - CSRF state validation on the callback
//! - Session endpoint and logout
//! - Dev mode bypass

use axum::{
	body::Body,
	http::{header, Request, StatusCode},
};
use chime_server::{create_app_state, create_router, ServerConfig};
use chime_server_config::GoogleOAuthSettings;
use tempfile::tempdir;
use tower::ServiceExt;

/// Creates a test app with an isolated database.
async fn setup_test_app(
	configure: impl FnOnce(&mut ServerConfig),
) -> (axum::Router, tempfile::TempDir) {
	let dir = tempdir().unwrap();
	let db_path = dir.path().join("test_auth.db");
	let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
	let pool = chime_server_db::create_pool(&db_url).await.unwrap();
	chime_server_db::run_migrations(&pool).await.unwrap();

	let mut config = ServerConfig::default();
	configure(&mut config);
	let state = create_app_state(pool, &config).await;
	(create_router(state), dir)
}

fn google_settings() -> GoogleOAuthSettings {
	GoogleOAuthSettings {
		client_id: "client-123".to_string(),
		client_secret: "secret".to_string(),
		redirect_path: "/auth/google/callback".to_string(),
	}
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Login page
// ============================================================================

#[tokio::test]
async fn test_login_page_is_public() {
	let (app, _dir) = setup_test_app(|_| {}).await;

	let response = app
		.oneshot(
			Request::builder()
				.uri("/auth/login")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// OAuth login / callback
// ============================================================================

#[tokio::test]
async fn test_google_login_without_provider_config_returns_501() {
	let (app, _dir) = setup_test_app(|_| {}).await;

	let response = app
		.oneshot(
			Request::builder()
				.uri("/auth/login/google")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_google_callback_without_provider_config_returns_501() {
	let (app, _dir) = setup_test_app(|_| {}).await;

	let response = app
		.oneshot(
			Request::builder()
				.uri("/auth/google/callback?code=test_code&state=test_state")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_google_login_redirects_to_consent_screen() {
	let (app, _dir) = setup_test_app(|config| {
		config.oauth.google = Some(google_settings());
	})
	.await;

	let response = app
		.oneshot(
			Request::builder()
				.uri("/auth/login/google")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::SEE_OTHER);
	let location = response
		.headers()
		.get(header::LOCATION)
		.unwrap()
		.to_str()
		.unwrap();
	assert!(location.starts_with("https://accounts.google.com/"));
	assert!(location.contains("state="));
}

#[tokio::test]
async fn test_callback_without_code_redirects_to_login() {
	let (app, _dir) = setup_test_app(|config| {
		config.oauth.google = Some(google_settings());
	})
	.await;

	let response = app
		.oneshot(
			Request::builder()
				.uri("/auth/google/callback")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::SEE_OTHER);
	assert_eq!(
		response.headers().get(header::LOCATION).unwrap(),
		"/auth/login"
	);
}

#[tokio::test]
async fn test_callback_with_unknown_state_redirects_to_login() {
	let (app, _dir) = setup_test_app(|config| {
		config.oauth.google = Some(google_settings());
	})
	.await;

	// A state token the server never issued must not reach code exchange.
	let response = app
		.oneshot(
			Request::builder()
				.uri("/auth/google/callback?code=abc&state=forged")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::SEE_OTHER);
	assert_eq!(
		response.headers().get(header::LOCATION).unwrap(),
		"/auth/login"
	);
}

// ============================================================================
// Session endpoint / logout
// ============================================================================

#[tokio::test]
async fn test_session_endpoint_requires_auth() {
	let (app, _dir) = setup_test_app(|_| {}).await;

	let response = app
		.oneshot(
			Request::builder()
				.uri("/auth/session")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	let json = body_json(response).await;
	assert_eq!(json["error"], "unauthorized");
}

#[tokio::test]
async fn test_logout_requires_auth() {
	let (app, _dir) = setup_test_app(|_| {}).await;

	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/auth/logout")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Dev mode
// ============================================================================

#[tokio::test]
async fn test_dev_mode_session_returns_dev_user() {
	let (app, _dir) = setup_test_app(|config| {
		config.auth.dev_mode = true;
	})
	.await;

	let response = app
		.oneshot(
			Request::builder()
				.uri("/auth/session")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
	let json = body_json(response).await;
	assert_eq!(json["user"]["email"], "dev@localhost");
	assert_eq!(json["user"]["display_name"], "Development User");
}

#[tokio::test]
async fn test_dev_mode_logout_clears_cookie() {
	let (app, _dir) = setup_test_app(|config| {
		config.auth.dev_mode = true;
	})
	.await;

	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/auth/logout")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::NO_CONTENT);
	let cookie = response
		.headers()
		.get(header::SET_COOKIE)
		.unwrap()
		.to_str()
		.unwrap();
	assert!(cookie.starts_with("chime_session="));
	assert!(cookie.contains("Max-Age=0"));
}
