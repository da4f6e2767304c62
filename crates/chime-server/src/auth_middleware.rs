// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Request authentication: the session gate and the `RequireAuth` extractor.
//!
//! Every inbound request outside the public prefixes must resolve a valid
//! session. Browser navigation without one is redirected to the login page;
//! `/api` requests get a 401 JSON body instead, since redirects are useless
//! to API clients. Handlers additionally take [`RequireAuth`] to receive
//! the authenticated user.

use axum::{
	extract::{FromRequestParts, Request, State},
	http::{request::Parts, HeaderMap},
	middleware::Next,
	response::{IntoResponse, Redirect, Response},
};

use chime_server_auth::{extract_session_cookie_with_name, CurrentUser, SessionId};

use crate::api::AppState;
use crate::api_response::{unauthorized, ErrorResponse};

/// Path prefixes reachable without a session: auth flows, health, the
/// executor report surface, API docs, and the favicon.
fn is_public_path(path: &str) -> bool {
	path.starts_with("/auth")
		|| path == "/health"
		|| path.starts_with("/internal/")
		|| path.starts_with("/docs")
		|| path.starts_with("/api-docs")
		|| path == "/favicon.ico"
}

/// Resolve the current user from request headers, if any.
///
/// Dev mode short-circuits to the provisioned dev user. Database failures
/// during lookup are logged and treated as "not authenticated" so the
/// request fails closed.
pub async fn resolve_current_user(headers: &HeaderMap, state: &AppState) -> Option<CurrentUser> {
	if state.auth_config.dev_mode {
		if let Some(dev_user) = &state.dev_user {
			return Some(CurrentUser::dev(dev_user.clone()));
		}
	}

	let cookie = extract_session_cookie_with_name(headers, &state.auth_config.session_cookie_name)?;
	let session_id: SessionId = cookie.parse::<uuid::Uuid>().ok()?.into();

	let session = match state.session_repo.get_valid(session_id).await {
		Ok(session) => session?,
		Err(e) => {
			tracing::error!(error = %e, "Failed to look up session");
			return None;
		}
	};

	match state.user_repo.get_by_id(session.user_id).await {
		Ok(Some(user)) => Some(CurrentUser::from_session(user, session.id)),
		Ok(None) => None,
		Err(e) => {
			tracing::error!(error = %e, "Failed to load session user");
			None
		}
	}
}

/// Gate middleware applied to the whole router.
pub async fn session_gate(
	State(state): State<AppState>,
	request: Request,
	next: Next,
) -> Response {
	let path = request.uri().path();
	if is_public_path(path) {
		return next.run(request).await;
	}

	if resolve_current_user(request.headers(), &state).await.is_some() {
		return next.run(request).await;
	}

	if path.starts_with("/api") {
		unauthorized::<ErrorResponse>("unauthorized", "Authentication required").into_response()
	} else {
		Redirect::to("/auth/login").into_response()
	}
}

/// Extractor yielding the authenticated user; rejects with 401 JSON.
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
	type Rejection = Response;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		match resolve_current_user(&parts.headers, state).await {
			Some(current_user) => Ok(RequireAuth(current_user)),
			None => Err(
				unauthorized::<ErrorResponse>("unauthorized", "Authentication required")
					.into_response(),
			),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn auth_and_health_paths_are_public() {
		assert!(is_public_path("/auth/login"));
		assert!(is_public_path("/auth/login/google"));
		assert!(is_public_path("/auth/google/callback"));
		assert!(is_public_path("/health"));
		assert!(is_public_path("/internal/executions/abc"));
		assert!(is_public_path("/favicon.ico"));
	}

	#[test]
	fn app_paths_are_gated() {
		assert!(!is_public_path("/"));
		assert!(!is_public_path("/projects"));
		assert!(!is_public_path("/api/projects"));
		assert!(!is_public_path("/api/jobs/123"));
		// Prefix must match a path segment boundary for /internal
		assert!(!is_public_path("/internals"));
	}
}
