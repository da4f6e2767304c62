// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! API response helpers.
//!
//! This module provides common response patterns for HTTP handlers:
//! - The shared `{error, message}` error body
//! - Error response constructors (bad_request, conflict, not_found, ...)
//! - A trait + macro so route modules can define their own error bodies

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Trait for API error response types that have `error` and `message` fields.
pub trait ApiErrorResponse: Serialize + Send {
	fn new(error: impl Into<String>, message: impl Into<String>) -> Self;
}

/// Implement `ApiErrorResponse` for a struct with `error` and `message` fields.
///
/// # Example
///
/// ```ignore
/// impl_api_error_response!(ErrorResponse);
/// ```
#[macro_export]
macro_rules! impl_api_error_response {
	($ty:ty) => {
		impl $crate::api_response::ApiErrorResponse for $ty {
			fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
				Self {
					error: error.into(),
					message: message.into(),
				}
			}
		}
	};
}

/// Standard error body for Chime API endpoints.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl_api_error_response!(ErrorResponse);

/// Error body for rejected submissions, carrying the field → message map
/// the client renders next to each offending input.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ValidationErrorResponse {
	pub error: String,
	pub message: String,
	pub fields: std::collections::BTreeMap<String, String>,
}

/// Create a 400 Bad Request response carrying per-field messages.
pub fn validation_failed(
	fields: std::collections::BTreeMap<String, String>,
) -> (StatusCode, Json<ValidationErrorResponse>) {
	(
		StatusCode::BAD_REQUEST,
		Json(ValidationErrorResponse {
			error: "validation_failed".to_string(),
			message: "The submitted form is invalid".to_string(),
			fields,
		}),
	)
}

/// Create a 400 Bad Request response.
pub fn bad_request<T: ApiErrorResponse>(
	error: impl Into<String>,
	message: impl Into<String>,
) -> (StatusCode, Json<T>) {
	(StatusCode::BAD_REQUEST, Json(T::new(error, message)))
}

/// Create a 401 Unauthorized response.
pub fn unauthorized<T: ApiErrorResponse>(
	error: impl Into<String>,
	message: impl Into<String>,
) -> (StatusCode, Json<T>) {
	(StatusCode::UNAUTHORIZED, Json(T::new(error, message)))
}

/// Create a 404 Not Found response.
pub fn not_found<T: ApiErrorResponse>(message: impl Into<String>) -> (StatusCode, Json<T>) {
	(StatusCode::NOT_FOUND, Json(T::new("not_found", message)))
}

/// Create a 409 Conflict response.
pub fn conflict<T: ApiErrorResponse>(
	error: impl Into<String>,
	message: impl Into<String>,
) -> (StatusCode, Json<T>) {
	(StatusCode::CONFLICT, Json(T::new(error, message)))
}

/// Create a 500 Internal Server Error response.
pub fn internal_error<T: ApiErrorResponse>(message: impl Into<String>) -> (StatusCode, Json<T>) {
	(
		StatusCode::INTERNAL_SERVER_ERROR,
		Json(T::new("internal_error", message)),
	)
}

/// Create a 501 Not Implemented response.
pub fn not_implemented<T: ApiErrorResponse>(message: impl Into<String>) -> (StatusCode, Json<T>) {
	(
		StatusCode::NOT_IMPLEMENTED,
		Json(T::new("not_implemented", message)),
	)
}
