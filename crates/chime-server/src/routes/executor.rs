// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Executor report endpoint.
//!
//! The external job runner calls this after every execution attempt. The
//! server appends the execution log row and advances the job's
//! `last_run_at`/`next_run_at`; nothing else in the system writes those
//! columns. Authentication is a shared bearer token from configuration,
//! not a user session.

use axum::{
	extract::{Path, State},
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use chime_crons_core::{truncate_response_body, CronJobId, ExecutionLog, ExecutionLogId};
use chime_server_auth::extract_bearer_token;
use chime_server_crons::{calculate_next_run, CronsRepository};

use crate::api::AppState;
use crate::api_response::{internal_error, not_found, not_implemented, unauthorized, ErrorResponse};

/// One execution attempt as reported by the executor.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ExecutionReport {
	pub status_code: u16,
	pub is_success: bool,
	#[serde(default = "default_attempt")]
	pub attempt_number: u32,
	pub duration_ms: u64,
	#[serde(default)]
	pub error_message: Option<String>,
	#[serde(default)]
	pub response_body: Option<String>,
	/// Defaults to the server's receive time.
	#[serde(default)]
	pub executed_at: Option<DateTime<Utc>>,
}

fn default_attempt() -> u32 {
	1
}

/// Response for a recorded execution.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReportExecutionResponse {
	pub id: ExecutionLogId,
	pub next_run_at: Option<DateTime<Utc>>,
}

/// POST /internal/executions/{id} - Record an execution attempt.
#[utoipa::path(
	post,
	path = "/internal/executions/{id}",
	params(
		("id" = CronJobId, Path, description = "Cron job ID"),
	),
	request_body = ExecutionReport,
	responses(
		(status = 201, description = "Execution recorded", body = ReportExecutionResponse),
		(status = 401, description = "Missing or wrong executor token", body = ErrorResponse),
		(status = 404, description = "Cron job not found", body = ErrorResponse),
		(status = 501, description = "Executor reporting not configured", body = ErrorResponse),
	),
	tag = "executor"
)]
#[instrument(skip(state, headers, report), fields(job_id = %id))]
pub async fn report_execution(
	State(state): State<AppState>,
	Path(id): Path<CronJobId>,
	headers: HeaderMap,
	Json(report): Json<ExecutionReport>,
) -> Response {
	let Some(expected_token) = &state.executor_token else {
		return not_implemented::<ErrorResponse>("Executor reporting is not configured")
			.into_response();
	};

	match extract_bearer_token(&headers) {
		Some(token) if token == *expected_token => {}
		_ => {
			warn!("executor report with missing or wrong token");
			return unauthorized::<ErrorResponse>("unauthorized", "Invalid executor token")
				.into_response();
		}
	}

	let job = match state.crons_repo.get_job_by_id(id).await {
		Ok(Some(job)) => job,
		Ok(None) => return not_found::<ErrorResponse>("Cron job not found").into_response(),
		Err(e) => {
			tracing::error!(error = %e, "Failed to get cron job");
			return internal_error::<ErrorResponse>("Failed to load cron job").into_response();
		}
	};

	let executed_at = report.executed_at.unwrap_or_else(Utc::now);

	let log = ExecutionLog {
		id: ExecutionLogId::new(),
		cron_job_id: job.id,
		executed_at,
		status_code: report.status_code,
		is_success: report.is_success,
		attempt_number: report.attempt_number,
		duration_ms: report.duration_ms,
		error_message: report.error_message,
		response_body: report
			.response_body
			.as_deref()
			.map(truncate_response_body),
	};

	if let Err(e) = state.crons_repo.create_log(&log).await {
		tracing::error!(error = %e, "Failed to record execution log");
		return internal_error::<ErrorResponse>("Failed to record execution").into_response();
	}

	let next_run_at = match calculate_next_run(&job.cron_expression, executed_at) {
		Ok(next) => Some(next),
		Err(e) => {
			warn!(error = %e, expression = %job.cron_expression, "Cannot compute next run");
			None
		}
	};

	if let Err(e) = state
		.crons_repo
		.update_job_run_times(job.id, executed_at, next_run_at)
		.await
	{
		tracing::error!(error = %e, "Failed to advance job run times");
		return internal_error::<ErrorResponse>("Failed to record execution").into_response();
	}

	info!(
		job_id = %job.id,
		status_code = report.status_code,
		is_success = report.is_success,
		attempt = report.attempt_number,
		"execution recorded"
	);

	(
		StatusCode::CREATED,
		Json(ReportExecutionResponse {
			id: log.id,
			next_run_at,
		}),
	)
		.into_response()
}
