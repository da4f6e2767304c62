// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pure validation for job submissions.
//!
//! Validation is applied before any write; submission proceeds only when
//! the returned error map is empty. Each failing field maps to exactly one
//! message, surfaced next to the offending field by the client.

use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::HashSet;
use url::Url;

use crate::pairs::KeyValuePair;

/// Classification of a field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
	EmptyField,
	InvalidUrl,
	IntervalTooSmall,
	DuplicateHeaderKey,
}

/// Field name → failure mapping produced by [`validate_job_form`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
	errors: BTreeMap<String, FieldError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
	pub kind: FieldErrorKind,
	pub message: String,
}

impl ValidationErrors {
	fn insert(&mut self, field: &str, kind: FieldErrorKind, message: &str) {
		self.errors.insert(
			field.to_string(),
			FieldError {
				kind,
				message: message.to_string(),
			},
		);
	}

	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn get(&self, field: &str) -> Option<&FieldError> {
		self.errors.get(field)
	}

	/// Flatten into the field → message map shown to users.
	pub fn messages(&self) -> BTreeMap<String, String> {
		self.errors
			.iter()
			.map(|(field, e)| (field.clone(), e.message.clone()))
			.collect()
	}
}

/// The submitted job fields that validation inspects.
#[derive(Debug, Clone)]
pub struct JobForm {
	pub name: String,
	pub target_url: String,
	pub schedule_type: String,
	pub interval_minutes: Option<u32>,
}

/// Smallest interval the dashboard accepts, in minutes.
pub const MIN_INTERVAL_MINUTES: u32 = 5;

/// Validate a job submission.
///
/// Header rows with blank keys are scratch rows and never count toward
/// duplication.
pub fn validate_job_form(form: &JobForm, headers: &[KeyValuePair]) -> ValidationErrors {
	let mut errors = ValidationErrors::default();

	if form.name.trim().is_empty() {
		errors.insert("name", FieldErrorKind::EmptyField, "Job name is required");
	}

	let target_url = form.target_url.trim();
	if target_url.is_empty() {
		errors.insert(
			"target_url",
			FieldErrorKind::EmptyField,
			"Target URL is required",
		);
	} else if Url::parse(target_url).is_err() {
		errors.insert("target_url", FieldErrorKind::InvalidUrl, "Invalid URL format");
	}

	if form.schedule_type == "interval" {
		let interval = form.interval_minutes.unwrap_or(0);
		if interval < MIN_INTERVAL_MINUTES {
			errors.insert(
				"interval",
				FieldErrorKind::IntervalTooSmall,
				"Minimum interval is 5 minutes",
			);
		}
	}

	let mut seen = HashSet::new();
	let duplicate = headers
		.iter()
		.map(|pair| pair.key.trim())
		.filter(|key| !key.is_empty())
		.any(|key| !seen.insert(key));
	if duplicate {
		errors.insert(
			"headers",
			FieldErrorKind::DuplicateHeaderKey,
			"Duplicate header keys are not allowed",
		);
	}

	errors
}
