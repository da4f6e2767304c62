// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Execution log types for the Chime job dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::CronJobId;

/// Unique identifier for an execution log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExecutionLogId(pub Uuid);

impl ExecutionLogId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for ExecutionLogId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for ExecutionLogId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for ExecutionLogId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// A single recorded execution of a cron job.
///
/// Written exclusively by the executor report path; the dashboard only
/// reads these, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExecutionLog {
	pub id: ExecutionLogId,
	pub cron_job_id: CronJobId,

	pub executed_at: DateTime<Utc>,

	pub status_code: u16,
	pub is_success: bool,
	pub attempt_number: u32,
	pub duration_ms: u64,

	pub error_message: Option<String>,
	/// Truncated response payload (max 10KB)
	pub response_body: Option<String>,
}

/// Maximum stored response body size in bytes (10KB).
pub const MAX_RESPONSE_BODY_BYTES: usize = 10 * 1024;

/// Truncate a response body to the maximum stored size.
pub fn truncate_response_body(body: &str) -> String {
	if body.len() <= MAX_RESPONSE_BODY_BYTES {
		return body.to_string();
	}
	// Back off to the nearest char boundary at or below the cap; the cap
	// itself may fall inside a multi-byte character.
	let mut end = MAX_RESPONSE_BODY_BYTES;
	while !body.is_char_boundary(end) {
		end -= 1;
	}
	format!("{}...[truncated]", &body[..end])
}
