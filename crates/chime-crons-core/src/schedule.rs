// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schedule expression model.
//!
//! Encodes a high-level schedule description into a 5-field cron expression
//! and renders known expressions back into human-readable text. The decoder
//! is a closed classifier over exactly the patterns the encoder produces:
//! expressions with lists, ranges, or steps outside the minute position are
//! never recognized and pass through unchanged, so expressions written
//! directly to the store still render as-is.

use serde::{Deserialize, Serialize};

/// Weekday names indexed by cron day-of-week (0 = Sunday).
const WEEKDAYS: [&str; 7] = [
	"Sunday",
	"Monday",
	"Tuesday",
	"Wednesday",
	"Thursday",
	"Friday",
	"Saturday",
];

/// High-level schedule description, as captured by the job form.
///
/// Daily and weekly schedules keep the raw hour/minute text split from the
/// form's `HH:MM` input so that the generated expression reproduces the
/// form's zero-padding exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleSpec {
	/// Every N minutes (N >= 5 enforced by validation, not here).
	Interval { minutes: u32 },
	/// At minute 0 of every hour.
	Hourly,
	/// Once a day at the given wall-clock time.
	Daily { hour: String, minute: String },
	/// Once a week on the given day (0 = Sunday) at the given time.
	Weekly {
		hour: String,
		minute: String,
		weekday: u8,
	},
	/// Fallback for unrecognized schedule types: run every minute.
	EveryMinute,
}

impl ScheduleSpec {
	/// Build a spec from the loosely-typed form fields.
	///
	/// Unrecognized schedule types deliberately fall back to
	/// [`ScheduleSpec::EveryMinute`] rather than erroring.
	pub fn from_form(schedule_type: &str, interval_minutes: u32, time: &str, weekday: u8) -> Self {
		let (hour, minute) = time.split_once(':').unwrap_or((time, "0"));
		match schedule_type {
			"interval" => Self::Interval {
				minutes: interval_minutes,
			},
			"hourly" => Self::Hourly,
			"daily" => Self::Daily {
				hour: hour.to_string(),
				minute: minute.to_string(),
			},
			"weekly" => Self::Weekly {
				hour: hour.to_string(),
				minute: minute.to_string(),
				weekday,
			},
			_ => Self::EveryMinute,
		}
	}
}

/// Encode a schedule as a 5-field cron expression.
pub fn build_cron_expression(spec: &ScheduleSpec) -> String {
	match spec {
		ScheduleSpec::Interval { minutes } => format!("*/{} * * * *", minutes),
		ScheduleSpec::Hourly => "0 * * * *".to_string(),
		ScheduleSpec::Daily { hour, minute } => format!("{} {} * * *", minute, hour),
		ScheduleSpec::Weekly {
			hour,
			minute,
			weekday,
		} => format!("{} {} * * {}", minute, hour, weekday),
		ScheduleSpec::EveryMinute => "* * * * *".to_string(),
	}
}

/// A field the classifier will consider: no list, range, or step syntax.
fn is_simple_field(field: &str) -> bool {
	!field.contains([',', '-', '/'])
}

/// Render a cron expression as human-readable text.
///
/// Recognizes exactly the patterns [`build_cron_expression`] produces, in
/// precedence order; everything else is returned unchanged. This is not a
/// cron parser and must not become one: downstream displays depend on this
/// fixed set of phrasings plus raw passthrough.
pub fn describe_cron_expression(expr: &str) -> String {
	let trimmed = expr.trim();
	if trimmed.is_empty() {
		return "Unknown schedule".to_string();
	}

	let parts: Vec<&str> = trimmed.split(' ').collect();
	if parts.len() != 5 {
		return expr.to_string();
	}

	let (minute, hour, day, month, weekday) = (parts[0], parts[1], parts[2], parts[3], parts[4]);

	// Every X minutes
	if let Some(interval) = minute.strip_prefix("*/") {
		if hour == "*" && day == "*" && month == "*" && weekday == "*" {
			let plural = if interval == "1" { "" } else { "s" };
			return format!("Every {} minute{}", interval, plural);
		}
	}

	// Hourly
	if minute == "0" && hour == "*" && day == "*" && month == "*" && weekday == "*" {
		return "Every hour".to_string();
	}

	// Daily. Hour and minute are padded as raw text, not re-validated.
	if day == "*"
		&& month == "*"
		&& weekday == "*"
		&& is_simple_field(hour)
		&& is_simple_field(minute)
	{
		return format!("Daily at {:0>2}:{:0>2}", hour, minute);
	}

	// Weekly
	if day == "*"
		&& month == "*"
		&& weekday != "*"
		&& is_simple_field(hour)
		&& is_simple_field(minute)
		&& is_simple_field(weekday)
	{
		let day_name = weekday
			.parse::<usize>()
			.ok()
			.and_then(|w| WEEKDAYS.get(w).copied())
			.unwrap_or("Unknown day");
		return format!("Weekly on {} at {:0>2}:{:0>2}", day_name, hour, minute);
	}

	expr.to_string()
}
