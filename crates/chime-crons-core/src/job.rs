// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cron job types for the Chime job dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::ProjectId;

/// Unique identifier for a cron job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CronJobId(pub Uuid);

impl CronJobId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for CronJobId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for CronJobId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for CronJobId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// HTTP method the executor uses when calling the target URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
	Get,
	Post,
	Put,
	Delete,
}

impl HttpMethod {
	/// A request body is only meaningful for methods that carry one.
	pub fn allows_body(&self) -> bool {
		!matches!(self, Self::Get)
	}
}

impl fmt::Display for HttpMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Get => write!(f, "GET"),
			Self::Post => write!(f, "POST"),
			Self::Put => write!(f, "PUT"),
			Self::Delete => write!(f, "DELETE"),
		}
	}
}

impl FromStr for HttpMethod {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"GET" => Ok(Self::Get),
			"POST" => Ok(Self::Post),
			"PUT" => Ok(Self::Put),
			"DELETE" => Ok(Self::Delete),
			_ => Err(format!("unknown http method: {}", s)),
		}
	}
}

/// A scheduled HTTP request.
///
/// `last_run_at` and `next_run_at` are advanced exclusively by the executor
/// report path; dashboard CRUD never touches them after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CronJob {
	pub id: CronJobId,
	pub project_id: ProjectId,

	pub name: String,
	pub target_url: String,
	pub http_method: HttpMethod,

	/// 5-field cron expression: minute hour day-of-month month day-of-week
	pub cron_expression: String,

	/// Extra request headers. Absent rather than empty when none were given.
	pub request_headers: Option<BTreeMap<String, String>>,
	/// Key/value request body. Only present when the method carries a body.
	pub request_body: Option<BTreeMap<String, String>>,

	pub is_active: bool,

	pub last_run_at: Option<DateTime<Utc>>,
	pub next_run_at: Option<DateTime<Utc>>,

	pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn cron_job_id_roundtrip(uuid_bytes in any::<[u8; 16]>()) {
			let uuid = Uuid::from_bytes(uuid_bytes);
			let id = CronJobId(uuid);
			let s = id.to_string();
			let parsed: CronJobId = s.parse().unwrap();
			prop_assert_eq!(id, parsed);
		}

		#[test]
		fn http_method_roundtrip(method in prop_oneof![
			Just(HttpMethod::Get),
			Just(HttpMethod::Post),
			Just(HttpMethod::Put),
			Just(HttpMethod::Delete),
		]) {
			let s = method.to_string();
			let parsed: HttpMethod = s.parse().unwrap();
			prop_assert_eq!(method, parsed);
		}
	}

	#[test]
	fn http_method_rejects_lowercase() {
		assert!("get".parse::<HttpMethod>().is_err());
	}

	#[test]
	fn only_get_forbids_body() {
		assert!(!HttpMethod::Get.allows_body());
		assert!(HttpMethod::Post.allows_body());
		assert!(HttpMethod::Put.allows_body());
		assert!(HttpMethod::Delete.allows_body());
	}

	#[test]
	fn http_method_serde_uses_uppercase() {
		let json = serde_json::to_string(&HttpMethod::Post).unwrap();
		assert_eq!(json, "\"POST\"");
		let parsed: HttpMethod = serde_json::from_str("\"DELETE\"").unwrap();
		assert_eq!(parsed, HttpMethod::Delete);
	}
}
