// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Authentication HTTP handlers: Google OAuth login, session info, logout.
//!
//! Callback failures (missing code, bad state, rejected exchange) send the
//! browser back to the login page rather than surfacing an error body.

use axum::{
	extract::{Query, State},
	http::{header::SET_COOKIE, HeaderValue},
	response::{Html, IntoResponse, Redirect, Response},
	Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use chime_server_auth::User;

use crate::api::AppState;
use crate::api_response::{internal_error, not_implemented, ErrorResponse};
use crate::auth_middleware::RequireAuth;

const LOGIN_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Chime - Sign in</title></head>
<body>
<main style="font-family: sans-serif; max-width: 24rem; margin: 6rem auto; text-align: center;">
<h1>Chime</h1>
<p>Sign in to manage your scheduled jobs.</p>
<p><a href="/auth/login/google">Continue with Google</a></p>
</main>
</body>
</html>
"#;

/// GET /auth/login - Minimal login page, the redirect target of the gate.
#[utoipa::path(
	get,
	path = "/auth/login",
	responses(
		(status = 200, description = "Login page", content_type = "text/html"),
	),
	tag = "auth"
)]
pub async fn login_page() -> impl IntoResponse {
	Html(LOGIN_PAGE)
}

/// GET /auth/login/google - Redirect to Google's consent screen.
#[utoipa::path(
	get,
	path = "/auth/login/google",
	responses(
		(status = 303, description = "Redirect to Google"),
		(status = 501, description = "Google OAuth not configured", body = ErrorResponse),
	),
	tag = "auth"
)]
#[instrument(skip(state))]
pub async fn login_google(State(state): State<AppState>) -> Response {
	let Some(google) = &state.google_oauth else {
		return not_implemented::<ErrorResponse>("Google OAuth is not configured").into_response();
	};

	let csrf_state = state.oauth_state_store.issue().await;
	Redirect::to(&google.authorize_url(&csrf_state)).into_response()
}

/// Query parameters Google sends to the callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
	pub code: Option<String>,
	pub state: Option<String>,
}

/// GET /auth/google/callback - Exchange the code and establish a session.
#[utoipa::path(
	get,
	path = "/auth/google/callback",
	params(
		("code" = Option<String>, Query, description = "Authorization code"),
		("state" = Option<String>, Query, description = "CSRF state token"),
	),
	responses(
		(status = 303, description = "Redirect to the dashboard with a session cookie, or back to the login page on failure"),
		(status = 501, description = "Google OAuth not configured", body = ErrorResponse),
	),
	tag = "auth"
)]
#[instrument(skip(state, params))]
pub async fn callback_google(
	State(state): State<AppState>,
	Query(params): Query<CallbackParams>,
) -> Response {
	let Some(google) = &state.google_oauth else {
		return not_implemented::<ErrorResponse>("Google OAuth is not configured").into_response();
	};

	let Some(code) = params.code else {
		return Redirect::to("/auth/login").into_response();
	};

	match params.state {
		Some(csrf_state) if state.oauth_state_store.consume(&csrf_state).await => {}
		_ => {
			warn!("OAuth callback with missing or unknown state");
			return Redirect::to("/auth/login").into_response();
		}
	}

	let access_token = match google.exchange_code(&code).await {
		Ok(token) => token,
		Err(e) => {
			warn!(error = %e, "Google code exchange failed");
			return Redirect::to("/auth/login").into_response();
		}
	};

	let userinfo = match google.fetch_userinfo(&access_token).await {
		Ok(info) => info,
		Err(e) => {
			warn!(error = %e, "Google userinfo fetch failed");
			return Redirect::to("/auth/login").into_response();
		}
	};

	let display_name = userinfo.name.unwrap_or_else(|| userinfo.email.clone());
	let user = match state
		.user_repo
		.upsert_google_user(&userinfo.sub, &userinfo.email, &display_name)
		.await
	{
		Ok(user) => user,
		Err(e) => {
			tracing::error!(error = %e, "Failed to provision user");
			return internal_error::<ErrorResponse>("Failed to sign in").into_response();
		}
	};

	let session = match state
		.session_repo
		.create(user.id, state.auth_config.session_ttl_secs)
		.await
	{
		Ok(session) => session,
		Err(e) => {
			tracing::error!(error = %e, "Failed to create session");
			return internal_error::<ErrorResponse>("Failed to sign in").into_response();
		}
	};

	info!(user_id = %user.id, "user signed in");

	let cookie = session_cookie(
		&state.auth_config.session_cookie_name,
		&session.id.to_string(),
		state.auth_config.session_ttl_secs as i64,
		&state.base_url,
	);
	with_cookie(Redirect::to("/").into_response(), &cookie)
}

/// Response body for the session endpoint.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SessionResponse {
	#[schema(value_type = Object)]
	pub user: User,
}

/// GET /auth/session - The currently signed-in user.
#[utoipa::path(
	get,
	path = "/auth/session",
	responses(
		(status = 200, description = "Current user", body = SessionResponse),
		(status = 401, description = "Not authenticated", body = ErrorResponse),
	),
	tag = "auth"
)]
pub async fn get_session(RequireAuth(current_user): RequireAuth) -> impl IntoResponse {
	Json(SessionResponse {
		user: current_user.user,
	})
}

/// POST /auth/logout - Delete the session and clear the cookie.
#[utoipa::path(
	post,
	path = "/auth/logout",
	responses(
		(status = 204, description = "Signed out"),
		(status = 401, description = "Not authenticated", body = ErrorResponse),
	),
	tag = "auth"
)]
#[instrument(skip(state, current_user))]
pub async fn logout(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Response {
	if let Some(session_id) = current_user.session_id {
		if let Err(e) = state.session_repo.delete(session_id).await {
			tracing::error!(error = %e, "Failed to delete session");
			return internal_error::<ErrorResponse>("Failed to sign out").into_response();
		}
		info!(user_id = %current_user.user.id, "user signed out");
	}

	let cookie = session_cookie(
		&state.auth_config.session_cookie_name,
		"",
		0,
		&state.base_url,
	);
	with_cookie(axum::http::StatusCode::NO_CONTENT.into_response(), &cookie)
}

/// Build the session cookie string. Secure is added for https deployments.
fn session_cookie(name: &str, value: &str, max_age_secs: i64, base_url: &str) -> String {
	let secure = if base_url.starts_with("https://") {
		"; Secure"
	} else {
		""
	};
	format!(
		"{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
		name, value, max_age_secs, secure
	)
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
	match HeaderValue::from_str(cookie) {
		Ok(value) => {
			response.headers_mut().insert(SET_COOKIE, value);
			response
		}
		Err(_) => internal_error::<ErrorResponse>("Failed to set session cookie").into_response(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn session_cookie_is_http_only_lax() {
		let cookie = session_cookie("chime_session", "abc", 3600, "http://localhost:8080");
		assert_eq!(
			cookie,
			"chime_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600"
		);
	}

	#[test]
	fn session_cookie_is_secure_on_https() {
		let cookie = session_cookie("chime_session", "abc", 3600, "https://chime.example.com");
		assert!(cookie.ends_with("; Secure"));
	}

	#[test]
	fn clearing_cookie_has_zero_max_age() {
		let cookie = session_cookie("chime_session", "", 0, "http://localhost:8080");
		assert!(cookie.contains("Max-Age=0"));
	}
}
