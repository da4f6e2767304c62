// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use std::sync::Arc;

use axum::{
	middleware,
	routing::{get, post},
	Router,
};
use sqlx::SqlitePool;
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use chime_server_auth::{AuthConfig, User, SESSION_COOKIE_NAME};
use chime_server_auth_google::{GoogleOAuthClient, GoogleOAuthConfig};
use chime_server_config::ServerConfig;
use chime_server_crons::SqliteCronsRepository;
use chime_server_db::{DbError, SessionRepository, UserRepository};

use crate::auth_middleware::session_gate;
use crate::oauth_state::OAuthStateStore;
use crate::routes;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub user_repo: Arc<UserRepository>,
	pub session_repo: Arc<SessionRepository>,
	pub crons_repo: Arc<SqliteCronsRepository>,
	pub auth_config: AuthConfig,
	/// Dev-mode bypass user, provisioned at startup when dev mode is on.
	pub dev_user: Option<User>,
	/// Externally visible base URL, used for cookie attributes and OAuth
	/// redirects.
	pub base_url: String,
	pub google_oauth: Option<Arc<GoogleOAuthClient>>,
	pub oauth_state_store: Arc<OAuthStateStore>,
	/// Shared bearer token the external executor presents on report calls;
	/// absent disables the report endpoint.
	pub executor_token: Option<String>,
	pub web_dir: Option<String>,
}

/// Creates the application state, initializing optional components.
pub async fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	let user_repo = Arc::new(UserRepository::new(pool.clone()));
	let session_repo = Arc::new(SessionRepository::new(pool.clone()));
	let crons_repo = Arc::new(SqliteCronsRepository::new(pool.clone()));

	let auth_config = AuthConfig {
		dev_mode: config.auth.dev_mode,
		session_cookie_name: SESSION_COOKIE_NAME.to_string(),
		session_ttl_secs: config.auth.session_ttl_secs,
	};

	let google_oauth = initialize_google_oauth(config);
	let oauth_state_store = Arc::new(OAuthStateStore::default());

	let dev_user = if auth_config.dev_mode {
		tracing::warn!("═══════════════════════════════════════════════════════════════════");
		tracing::warn!("⚠️  DEV MODE AUTHENTICATION ENABLED - DO NOT USE IN PRODUCTION ⚠️");
		tracing::warn!("All unauthenticated requests will be served as the dev user!");
		tracing::warn!("Set CHIME_SERVER_ENV=production to prevent accidental production use.");
		tracing::warn!("═══════════════════════════════════════════════════════════════════");
		match create_or_get_dev_user(&user_repo).await {
			Ok(user) => {
				tracing::info!(user_id = %user.id, "Dev mode enabled, using dev user");
				Some(user)
			}
			Err(e) => {
				tracing::error!(error = %e, "Failed to create dev user, dev mode disabled");
				None
			}
		}
	} else {
		None
	};

	AppState {
		pool,
		user_repo,
		session_repo,
		crons_repo,
		auth_config,
		dev_user,
		base_url: config.http.base_url.clone(),
		google_oauth,
		oauth_state_store,
		executor_token: config.auth.executor_token.clone(),
		web_dir: config.paths.web_dir.clone(),
	}
}

/// Initialize the Google OAuth client if credentials are configured.
fn initialize_google_oauth(config: &ServerConfig) -> Option<Arc<GoogleOAuthClient>> {
	match &config.oauth.google {
		Some(google) => {
			tracing::info!("Google OAuth configured, creating client");
			let redirect_url = format!(
				"{}{}",
				config.http.base_url.trim_end_matches('/'),
				google.redirect_path
			);
			Some(Arc::new(GoogleOAuthClient::new(GoogleOAuthConfig {
				client_id: google.client_id.clone(),
				client_secret: google.client_secret.clone(),
				redirect_url,
			})))
		}
		None => {
			tracing::info!("Google OAuth not configured");
			None
		}
	}
}

/// Provision (or fetch) the dev-mode user account.
pub async fn create_or_get_dev_user(user_repo: &Arc<UserRepository>) -> Result<User, DbError> {
	user_repo
		.upsert_google_user("dev", "dev@localhost", "Development User")
		.await
}

/// Build the application router.
///
/// Every route is behind the session gate; the gate itself decides which
/// path prefixes are public. Static dashboard assets, when configured, are
/// served from the fallback so API routes always win.
pub fn create_router(state: AppState) -> Router {
	let web_dir = state.web_dir.clone();

	let mut router = Router::new()
		.route("/health", get(routes::health::health_check))
		// Auth routes (public prefix; session/logout enforce auth in-handler)
		.route("/auth/login", get(routes::auth::login_page))
		.route("/auth/login/google", get(routes::auth::login_google))
		.route("/auth/google/callback", get(routes::auth::callback_google))
		.route("/auth/session", get(routes::auth::get_session))
		.route("/auth/logout", post(routes::auth::logout))
		// Project routes
		.route(
			"/api/projects",
			get(routes::projects::list_projects).post(routes::projects::create_project),
		)
		.route("/api/projects/{id}", get(routes::projects::get_project))
		// Cron job routes
		.route(
			"/api/projects/{id}/jobs",
			get(routes::crons::list_jobs).post(routes::crons::create_job),
		)
		.route(
			"/api/jobs/{id}",
			get(routes::crons::get_job).delete(routes::crons::delete_job),
		)
		.route("/api/jobs/{id}/logs", get(routes::crons::list_logs))
		// Executor report endpoint (bearer-token auth, not session auth)
		.route(
			"/internal/executions/{id}",
			post(routes::executor::report_execution),
		)
		.with_state(state.clone());

	// Add OpenAPI documentation
	router = router.merge(
		SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::api_docs::ApiDoc::openapi()),
	);

	// Serve pre-built dashboard assets if configured
	if let Some(web_path) = web_dir {
		tracing::info!(web_dir = %web_path, "serving static web assets");
		router = router.fallback_service(
			ServeDir::new(&web_path).fallback(ServeFile::new(format!("{web_path}/index.html"))),
		);
	}

	// The gate wraps everything, including docs and static assets; public
	// prefixes are exempted inside the middleware.
	router.layer(middleware::from_fn_with_state(state, session_gate))
}

#[cfg(test)]
mod tests {
	use super::*;

	use axum::{
		body::Body,
		http::{header, Request, StatusCode},
	};
	use tempfile::tempdir;
	use tower::ServiceExt;

	async fn test_router(configure: impl FnOnce(&mut ServerConfig)) -> (Router, tempfile::TempDir) {
		let dir = tempdir().unwrap();
		let db_path = dir.path().join("api_test.db");
		let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
		let pool = chime_server_db::create_pool(&db_url).await.unwrap();
		chime_server_db::run_migrations(&pool).await.unwrap();

		let mut config = ServerConfig::default();
		configure(&mut config);
		let state = create_app_state(pool, &config).await;
		(create_router(state), dir)
	}

	#[tokio::test]
	async fn health_is_reachable_without_a_session() {
		let (app, _dir) = test_router(|_| {}).await;

		let response = app
			.oneshot(
				Request::builder()
					.uri("/health")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);
	}

	#[tokio::test]
	async fn sessionless_browser_navigation_redirects_to_login() {
		let (app, _dir) = test_router(|_| {}).await;

		let response = app
			.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::SEE_OTHER);
		assert_eq!(
			response.headers().get(header::LOCATION).unwrap(),
			"/auth/login"
		);
	}

	#[tokio::test]
	async fn sessionless_api_request_gets_401_json() {
		let (app, _dir) = test_router(|_| {}).await;

		let response = app
			.oneshot(
				Request::builder()
					.uri("/api/projects")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		let body = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
		assert_eq!(json["error"], "unauthorized");
	}

	#[tokio::test]
	async fn dev_mode_serves_api_requests_without_a_session() {
		let (app, _dir) = test_router(|config| {
			config.auth.dev_mode = true;
		})
		.await;

		let response = app
			.oneshot(
				Request::builder()
					.uri("/api/projects")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::OK);
	}

	#[tokio::test]
	async fn garbage_session_cookie_is_rejected() {
		let (app, _dir) = test_router(|_| {}).await;

		let response = app
			.oneshot(
				Request::builder()
					.uri("/api/projects")
					.header(header::COOKIE, "chime_session=not-a-uuid")
					.body(Body::empty())
					.unwrap(),
			)
			.await
			.unwrap();

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	}
}
