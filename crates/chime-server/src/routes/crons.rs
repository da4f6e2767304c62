// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cron job HTTP handlers.
//!
//! Job submissions are validated before any write; a validation failure
//! returns 400 with the field → message map and writes nothing. Schedule
//! fields arrive in the form's flat shape (type + interval + time +
//! weekday) and are encoded to a cron expression here; list and detail
//! responses carry the human-readable rendering alongside the raw
//! expression.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument};

use chime_crons_core::{
	build_cron_expression, build_object_from_pairs, describe_cron_expression, validate_job_form,
	CronJob, CronJobId, ExecutionLog, HttpMethod, JobForm, KeyValuePair, OwnerId, ProjectId,
	ScheduleSpec,
};
use chime_server_crons::{validate_cron_expression, CronsRepository};

use crate::api::AppState;
use crate::api_response::{internal_error, not_found, validation_failed, ErrorResponse};
use crate::auth_middleware::RequireAuth;
use crate::routes::projects::{get_owned_project, owner_of};

/// Look up a job and verify the caller owns its project.
pub(crate) async fn get_owned_job(
	state: &AppState,
	id: CronJobId,
	owner: OwnerId,
) -> Result<CronJob, axum::response::Response> {
	let job = match state.crons_repo.get_job_by_id(id).await {
		Ok(Some(job)) => job,
		Ok(None) => return Err(not_found::<ErrorResponse>("Cron job not found").into_response()),
		Err(e) => {
			tracing::error!(error = %e, %id, "Failed to get cron job");
			return Err(internal_error::<ErrorResponse>("Failed to load cron job").into_response());
		}
	};

	// Ownership flows through the project; a foreign job is a 404.
	get_owned_project(state, job.project_id, owner)
		.await
		.map_err(|_| not_found::<ErrorResponse>("Cron job not found").into_response())?;

	Ok(job)
}

/// One job row in a project listing.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CronJobSummary {
	pub id: CronJobId,
	pub name: String,
	pub target_url: String,
	pub http_method: HttpMethod,
	pub cron_expression: String,
	pub schedule_description: String,
	pub is_active: bool,
	pub last_run_at: Option<DateTime<Utc>>,
	pub next_run_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
}

impl From<CronJob> for CronJobSummary {
	fn from(job: CronJob) -> Self {
		let schedule_description = describe_cron_expression(&job.cron_expression);
		Self {
			id: job.id,
			name: job.name,
			target_url: job.target_url,
			http_method: job.http_method,
			cron_expression: job.cron_expression,
			schedule_description,
			is_active: job.is_active,
			last_run_at: job.last_run_at,
			next_run_at: job.next_run_at,
			created_at: job.created_at,
		}
	}
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListJobsResponse {
	pub jobs: Vec<CronJobSummary>,
}

/// Full job payload plus the rendered schedule.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CronJobDetailResponse {
	pub job: CronJob,
	pub schedule_description: String,
}

impl From<CronJob> for CronJobDetailResponse {
	fn from(job: CronJob) -> Self {
		let schedule_description = describe_cron_expression(&job.cron_expression);
		Self {
			job,
			schedule_description,
		}
	}
}

/// GET /api/projects/{id}/jobs - List a project's jobs, newest first.
#[utoipa::path(
	get,
	path = "/api/projects/{id}/jobs",
	params(
		("id" = ProjectId, Path, description = "Project ID"),
	),
	responses(
		(status = 200, description = "List of cron jobs", body = ListJobsResponse),
		(status = 401, description = "Not authenticated", body = ErrorResponse),
		(status = 404, description = "Project not found", body = ErrorResponse),
	),
	tag = "crons"
)]
#[instrument(skip(state, current_user), fields(project_id = %id))]
pub async fn list_jobs(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<ProjectId>,
) -> impl IntoResponse {
	let project = match get_owned_project(&state, id, owner_of(&current_user)).await {
		Ok(project) => project,
		Err(response) => return response,
	};

	match state.crons_repo.list_jobs(project.id).await {
		Ok(jobs) => {
			let jobs: Vec<CronJobSummary> = jobs.into_iter().map(Into::into).collect();
			Json(ListJobsResponse { jobs }).into_response()
		}
		Err(e) => {
			tracing::error!(error = %e, "Failed to list cron jobs");
			internal_error::<ErrorResponse>("Failed to load cron jobs").into_response()
		}
	}
}

/// Request to create a cron job, in the job form's flat shape.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCronJobRequest {
	pub name: String,
	pub target_url: String,
	pub http_method: HttpMethod,
	/// "interval", "hourly", "daily", or "weekly".
	pub schedule_type: String,
	#[serde(default)]
	pub interval_minutes: Option<u32>,
	/// Wall-clock "HH:MM" for daily and weekly schedules.
	#[serde(default = "default_time")]
	pub time: String,
	/// 0 = Sunday .. 6 = Saturday, for weekly schedules.
	#[serde(default = "default_weekday")]
	pub weekday: u8,
	#[serde(default)]
	pub headers: Vec<KeyValuePair>,
	#[serde(default)]
	pub body: Vec<KeyValuePair>,
	#[serde(default = "default_active")]
	pub is_active: bool,
}

fn default_time() -> String {
	"00:00".to_string()
}

fn default_weekday() -> u8 {
	1
}

fn default_active() -> bool {
	true
}

/// POST /api/projects/{id}/jobs - Create a cron job.
#[utoipa::path(
	post,
	path = "/api/projects/{id}/jobs",
	params(
		("id" = ProjectId, Path, description = "Project ID"),
	),
	request_body = CreateCronJobRequest,
	responses(
		(status = 201, description = "Cron job created", body = CronJobDetailResponse),
		(status = 400, description = "Invalid submission"),
		(status = 401, description = "Not authenticated", body = ErrorResponse),
		(status = 404, description = "Project not found", body = ErrorResponse),
	),
	tag = "crons"
)]
#[instrument(skip(state, current_user, req), fields(project_id = %id))]
pub async fn create_job(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<ProjectId>,
	Json(req): Json<CreateCronJobRequest>,
) -> impl IntoResponse {
	let project = match get_owned_project(&state, id, owner_of(&current_user)).await {
		Ok(project) => project,
		Err(response) => return response,
	};

	let form = JobForm {
		name: req.name.clone(),
		target_url: req.target_url.clone(),
		schedule_type: req.schedule_type.clone(),
		interval_minutes: req.interval_minutes,
	};
	let errors = validate_job_form(&form, &req.headers);
	if !errors.is_empty() {
		return validation_failed(errors.messages()).into_response();
	}

	let spec = ScheduleSpec::from_form(
		&req.schedule_type,
		req.interval_minutes.unwrap_or(0),
		&req.time,
		req.weekday,
	);
	let cron_expression = build_cron_expression(&spec);

	// The encoder reproduces the form's time fields verbatim, so "25:99"
	// arrives here as an expression the scheduler could never run.
	if validate_cron_expression(&cron_expression).is_err() {
		let mut fields = BTreeMap::new();
		fields.insert("schedule".to_string(), "Invalid schedule".to_string());
		return validation_failed(fields).into_response();
	}

	let request_headers = build_object_from_pairs(&req.headers);
	let request_body = if req.http_method.allows_body() {
		build_object_from_pairs(&req.body)
	} else {
		None
	};

	let now = Utc::now();
	let job = CronJob {
		id: CronJobId::new(),
		project_id: project.id,
		name: req.name.trim().to_string(),
		target_url: req.target_url.trim().to_string(),
		http_method: req.http_method,
		cron_expression,
		request_headers,
		request_body,
		is_active: req.is_active,
		last_run_at: None,
		next_run_at: Some(now),
		created_at: now,
	};

	if let Err(e) = state.crons_repo.create_job(&job).await {
		tracing::error!(error = %e, "Failed to create cron job");
		return internal_error::<ErrorResponse>("Failed to create cron job").into_response();
	}

	info!(job_id = %job.id, project_id = %project.id, "cron job created");

	(StatusCode::CREATED, Json(CronJobDetailResponse::from(job))).into_response()
}

/// GET /api/jobs/{id} - Cron job detail.
#[utoipa::path(
	get,
	path = "/api/jobs/{id}",
	params(
		("id" = CronJobId, Path, description = "Cron job ID"),
	),
	responses(
		(status = 200, description = "Cron job details", body = CronJobDetailResponse),
		(status = 401, description = "Not authenticated", body = ErrorResponse),
		(status = 404, description = "Cron job not found", body = ErrorResponse),
	),
	tag = "crons"
)]
#[instrument(skip(state, current_user), fields(job_id = %id))]
pub async fn get_job(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<CronJobId>,
) -> impl IntoResponse {
	match get_owned_job(&state, id, owner_of(&current_user)).await {
		Ok(job) => Json(CronJobDetailResponse::from(job)).into_response(),
		Err(response) => response,
	}
}

/// DELETE /api/jobs/{id} - Delete a cron job and its logs.
#[utoipa::path(
	delete,
	path = "/api/jobs/{id}",
	params(
		("id" = CronJobId, Path, description = "Cron job ID"),
	),
	responses(
		(status = 204, description = "Cron job deleted"),
		(status = 401, description = "Not authenticated", body = ErrorResponse),
		(status = 404, description = "Cron job not found", body = ErrorResponse),
	),
	tag = "crons"
)]
#[instrument(skip(state, current_user), fields(job_id = %id))]
pub async fn delete_job(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<CronJobId>,
) -> impl IntoResponse {
	let job = match get_owned_job(&state, id, owner_of(&current_user)).await {
		Ok(job) => job,
		Err(response) => return response,
	};

	if let Err(e) = state.crons_repo.delete_job(job.id).await {
		tracing::error!(error = %e, "Failed to delete cron job");
		return internal_error::<ErrorResponse>("Failed to delete cron job").into_response();
	}

	info!(job_id = %job.id, "cron job deleted");

	StatusCode::NO_CONTENT.into_response()
}

#[derive(Debug, Deserialize)]
pub struct ListLogsParams {
	pub limit: Option<u32>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListLogsResponse {
	pub logs: Vec<ExecutionLog>,
}

/// GET /api/jobs/{id}/logs - Execution logs, newest first.
#[utoipa::path(
	get,
	path = "/api/jobs/{id}/logs",
	params(
		("id" = CronJobId, Path, description = "Cron job ID"),
		("limit" = Option<u32>, Query, description = "Max results (default 50)"),
	),
	responses(
		(status = 200, description = "Execution logs", body = ListLogsResponse),
		(status = 401, description = "Not authenticated", body = ErrorResponse),
		(status = 404, description = "Cron job not found", body = ErrorResponse),
	),
	tag = "crons"
)]
#[instrument(skip(state, current_user), fields(job_id = %id))]
pub async fn list_logs(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<CronJobId>,
	Query(params): Query<ListLogsParams>,
) -> impl IntoResponse {
	let job = match get_owned_job(&state, id, owner_of(&current_user)).await {
		Ok(job) => job,
		Err(response) => return response,
	};

	let limit = params.limit.unwrap_or(50);
	match state.crons_repo.list_logs(job.id, limit).await {
		Ok(logs) => Json(ListLogsResponse { logs }).into_response(),
		Err(e) => {
			tracing::error!(error = %e, "Failed to list execution logs");
			internal_error::<ErrorResponse>("Failed to load execution logs").into_response()
		}
	}
}
