// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Project HTTP handlers.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::IntoResponse,
	Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument};

use chime_crons_core::{OwnerId, Project, ProjectId};
use chime_server_crons::CronsRepository;

use crate::api::AppState;
use crate::api_response::{internal_error, not_found, validation_failed, ErrorResponse};
use crate::auth_middleware::RequireAuth;

/// Look up a project and verify the caller owns it.
///
/// Foreign projects answer 404 rather than 403 so their existence is not
/// leaked.
pub(crate) async fn get_owned_project(
	state: &AppState,
	id: ProjectId,
	owner: OwnerId,
) -> Result<Project, axum::response::Response> {
	match state.crons_repo.get_project_by_id(id).await {
		Ok(Some(project)) if project.owner == owner => Ok(project),
		Ok(_) => Err(not_found::<ErrorResponse>("Project not found").into_response()),
		Err(e) => {
			tracing::error!(error = %e, %id, "Failed to get project");
			Err(internal_error::<ErrorResponse>("Failed to load project").into_response())
		}
	}
}

pub(crate) fn owner_of(current_user: &chime_server_auth::CurrentUser) -> OwnerId {
	OwnerId(current_user.user.id.into_inner())
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListProjectsResponse {
	pub projects: Vec<Project>,
}

/// GET /api/projects - List the caller's projects, oldest first.
#[utoipa::path(
	get,
	path = "/api/projects",
	responses(
		(status = 200, description = "List of projects", body = ListProjectsResponse),
		(status = 401, description = "Not authenticated", body = ErrorResponse),
	),
	tag = "projects"
)]
#[instrument(skip(state, current_user))]
pub async fn list_projects(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> impl IntoResponse {
	match state.crons_repo.list_projects(owner_of(&current_user)).await {
		Ok(projects) => Json(ListProjectsResponse { projects }).into_response(),
		Err(e) => {
			tracing::error!(error = %e, "Failed to list projects");
			internal_error::<ErrorResponse>("Failed to load projects").into_response()
		}
	}
}

/// Request to create a new project.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateProjectRequest {
	pub name: String,
	pub description: String,
}

/// POST /api/projects - Create a project.
#[utoipa::path(
	post,
	path = "/api/projects",
	request_body = CreateProjectRequest,
	responses(
		(status = 201, description = "Project created", body = Project),
		(status = 400, description = "Invalid request"),
		(status = 401, description = "Not authenticated", body = ErrorResponse),
	),
	tag = "projects"
)]
#[instrument(skip(state, current_user, req))]
pub async fn create_project(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Json(req): Json<CreateProjectRequest>,
) -> impl IntoResponse {
	let mut fields = BTreeMap::new();
	if req.name.trim().is_empty() {
		fields.insert("name".to_string(), "Project name is required".to_string());
	}
	if req.description.trim().is_empty() {
		fields.insert(
			"description".to_string(),
			"Project description is required".to_string(),
		);
	}
	if !fields.is_empty() {
		return validation_failed(fields).into_response();
	}

	let project = Project {
		id: ProjectId::new(),
		owner: owner_of(&current_user),
		name: req.name.trim().to_string(),
		description: req.description.trim().to_string(),
		created_at: Utc::now(),
	};

	if let Err(e) = state.crons_repo.create_project(&project).await {
		tracing::error!(error = %e, "Failed to create project");
		return internal_error::<ErrorResponse>("Failed to create project").into_response();
	}

	info!(project_id = %project.id, "project created");

	(StatusCode::CREATED, Json(project)).into_response()
}

/// GET /api/projects/{id} - Project detail.
#[utoipa::path(
	get,
	path = "/api/projects/{id}",
	params(
		("id" = ProjectId, Path, description = "Project ID"),
	),
	responses(
		(status = 200, description = "Project details", body = Project),
		(status = 401, description = "Not authenticated", body = ErrorResponse),
		(status = 404, description = "Project not found", body = ErrorResponse),
	),
	tag = "projects"
)]
#[instrument(skip(state, current_user), fields(project_id = %id))]
pub async fn get_project(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<ProjectId>,
) -> impl IntoResponse {
	match get_owned_project(&state, id, owner_of(&current_user)).await {
		Ok(project) => Json(project).into_response(),
		Err(response) => response,
	}
}
