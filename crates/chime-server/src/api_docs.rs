// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! OpenAPI documentation for chime-server.
//!
//! This module provides the OpenAPI 3.0 specification for the Chime Server
//! API, generated from Rust types using utoipa.

use utoipa::OpenApi;

/// Main OpenAPI documentation struct.
///
/// This generates the complete OpenAPI specification for the Chime Server
/// API. Access the interactive documentation at `/docs` and the raw JSON
/// spec at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
	info(
		title = "Chime Server API",
		version = "0.1.0",
		description = "Scheduled HTTP job dashboard API. Chime stores projects and their scheduled HTTP jobs, renders cron schedules for display, and records execution reports from the external job runner.",
		license(name = "Proprietary"),
		contact(
			name = "Geoffrey Huntley",
			email = "ghuntley@ghuntley.com",
			url = "https://ghuntley.com"
		)
	),
	servers(
		(url = "/", description = "Local server")
	),
	tags(
		(name = "health", description = "Health checks and system status"),
		(name = "auth", description = "Google OAuth sign-in and session management"),
		(name = "projects", description = "Project CRUD operations"),
		(name = "crons", description = "Cron job CRUD and execution log reads"),
		(name = "executor", description = "Execution reporting from the external job runner")
	),
	paths(
		// Health endpoints
		crate::routes::health::health_check,
		// Auth endpoints
		crate::routes::auth::login_page,
		crate::routes::auth::login_google,
		crate::routes::auth::callback_google,
		crate::routes::auth::get_session,
		crate::routes::auth::logout,
		// Project endpoints
		crate::routes::projects::list_projects,
		crate::routes::projects::create_project,
		crate::routes::projects::get_project,
		// Cron job endpoints
		crate::routes::crons::list_jobs,
		crate::routes::crons::create_job,
		crate::routes::crons::get_job,
		crate::routes::crons::delete_job,
		crate::routes::crons::list_logs,
		// Executor endpoints
		crate::routes::executor::report_execution,
	),
	components(
		schemas(
			// Domain types
			chime_crons_core::Project,
			chime_crons_core::CronJob,
			chime_crons_core::ExecutionLog,
			chime_crons_core::HttpMethod,
			chime_crons_core::KeyValuePair,
			// API request/response types
			crate::api_response::ErrorResponse,
			crate::api_response::ValidationErrorResponse,
			crate::routes::health::HealthResponse,
			crate::routes::auth::SessionResponse,
			crate::routes::projects::ListProjectsResponse,
			crate::routes::projects::CreateProjectRequest,
			crate::routes::crons::ListJobsResponse,
			crate::routes::crons::CronJobSummary,
			crate::routes::crons::CreateCronJobRequest,
			crate::routes::crons::CronJobDetailResponse,
			crate::routes::crons::ListLogsResponse,
			crate::routes::executor::ExecutionReport,
			crate::routes::executor::ReportExecutionResponse,
		)
	)
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
	use super::*;

	/// Verify the OpenAPI spec generates valid JSON.
	#[test]
	fn test_openapi_spec_generates_valid_json() {
		let spec = ApiDoc::openapi();
		let json = serde_json::to_string_pretty(&spec).expect("should serialize to JSON");

		assert!(!json.is_empty());
		assert!(json.contains("\"openapi\""));
		assert!(json.contains("Chime Server API"));
	}

	/// Verify all expected tags are present.
	#[test]
	fn test_openapi_spec_has_all_tags() {
		let spec = ApiDoc::openapi();
		let json = serde_json::to_string(&spec).expect("should serialize");

		for tag in ["health", "auth", "projects", "crons", "executor"] {
			assert!(json.contains(tag), "Missing tag: {tag}");
		}
	}

	/// Verify all documented endpoints are present in paths.
	#[test]
	fn test_openapi_spec_has_documented_paths() {
		let spec = ApiDoc::openapi();
		let json = serde_json::to_string(&spec).expect("should serialize");

		let expected_paths = [
			"/health",
			"/auth/login",
			"/auth/session",
			"/api/projects",
			"/api/projects/{id}",
			"/api/projects/{id}/jobs",
			"/api/jobs/{id}",
			"/api/jobs/{id}/logs",
			"/internal/executions/{id}",
		];
		for path in expected_paths {
			assert!(json.contains(path), "Missing path: {path}");
		}
	}
}
