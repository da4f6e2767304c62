// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Next run calculation for cron jobs.

use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;

use crate::error::{CronsServerError, Result};

/// Convert a standard 5-field Unix cron expression to the 7-field format
/// expected by the `cron` crate.
///
/// 5-field format: minute hour day-of-month month day-of-week
/// 7-field format: second minute hour day-of-month month day-of-week year
///
/// We add "0" for seconds (run at :00 of each minute) and "*" for year (any
/// year). The day-of-week field is remapped from Unix ordinals (0-7, both 0
/// and 7 meaning Sunday) to the crate's Sunday-first 1-7 ordinals.
fn convert_to_cron_crate_format(expression: &str) -> String {
	let fields: Vec<&str> = expression.split_whitespace().collect();
	if fields.len() >= 6 {
		// Already in extended format, use as-is
		expression.to_string()
	} else if fields.len() == 5 {
		// Standard 5-field Unix cron - convert to 7-field
		format!(
			"0 {} {} {} {} {} *",
			fields[0],
			fields[1],
			fields[2],
			fields[3],
			convert_day_of_week(fields[4])
		)
	} else {
		// Invalid format, return as-is and let the parser error
		expression.to_string()
	}
}

/// Remap a bare Unix day-of-week ordinal to the `cron` crate's 1-7 range.
///
/// Only a single integer is touched; `*`, names, lists, and ranges pass
/// through unchanged for the parser to judge. Out-of-range integers are
/// also left as-is so they fail parsing instead of wrapping silently.
fn convert_day_of_week(field: &str) -> String {
	match field.parse::<u8>() {
		Ok(n) if n <= 7 => ((n % 7) + 1).to_string(),
		_ => field.to_string(),
	}
}

/// Calculate the next run time for a stored cron expression.
///
/// All calculation is in UTC; the dashboard stores plain timestamps.
///
/// # Arguments
///
/// * `expression` - The job's 5-field cron expression
/// * `after` - Calculate the next run after this time (typically now or the
///   reported execution time)
///
/// # Errors
///
/// Returns an error if the expression cannot be parsed or has no next
/// occurrence.
pub fn calculate_next_run(expression: &str, after: DateTime<Utc>) -> Result<DateTime<Utc>> {
	let cron_expr = convert_to_cron_crate_format(expression);

	let schedule = Schedule::from_str(&cron_expr)
		.map_err(|e| CronsServerError::InvalidCronExpression(e.to_string()))?;

	schedule.after(&after).next().ok_or_else(|| {
		CronsServerError::Internal("No next run time found for cron expression".to_string())
	})
}

/// Validate a cron expression without calculating a next run.
pub fn validate_cron_expression(expression: &str) -> Result<()> {
	let cron_expr = convert_to_cron_crate_format(expression);
	Schedule::from_str(&cron_expr)
		.map_err(|e| CronsServerError::InvalidCronExpression(e.to_string()))?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Datelike, TimeZone, Weekday};

	#[test]
	fn daily_midnight_rolls_to_next_day() {
		// 2026-01-19 10:30:00 UTC
		let after = Utc.with_ymd_and_hms(2026, 1, 19, 10, 30, 0).unwrap();

		let next = calculate_next_run("0 0 * * *", after).unwrap();

		// Should be 2026-01-20 00:00:00 UTC
		assert_eq!(next.date_naive().to_string(), "2026-01-20");
		assert_eq!(next.time().to_string(), "00:00:00");
	}

	#[test]
	fn interval_lands_on_next_boundary() {
		// 2026-01-19 10:32:00 UTC
		let after = Utc.with_ymd_and_hms(2026, 1, 19, 10, 32, 0).unwrap();

		let next = calculate_next_run("*/15 * * * *", after).unwrap();

		// Should be 2026-01-19 10:45:00 UTC
		assert_eq!(next.date_naive().to_string(), "2026-01-19");
		assert_eq!(next.time().to_string(), "10:45:00");
	}

	#[test]
	fn daily_time_with_form_zero_padding() {
		let after = Utc.with_ymd_and_hms(2026, 1, 19, 7, 0, 0).unwrap();

		// The form emits zero-padded fields ("00 09 * * *" for 09:00)
		let next = calculate_next_run("00 09 * * *", after).unwrap();

		assert_eq!(next.date_naive().to_string(), "2026-01-19");
		assert_eq!(next.time().to_string(), "09:00:00");
	}

	#[test]
	fn weekly_sunday_is_unix_zero() {
		// Friday 2026-01-16
		let after = Utc.with_ymd_and_hms(2026, 1, 16, 12, 0, 0).unwrap();

		let next = calculate_next_run("0 9 * * 0", after).unwrap();

		assert_eq!(next.weekday(), Weekday::Sun);
		assert_eq!(next.date_naive().to_string(), "2026-01-18");
	}

	#[test]
	fn weekly_ordinals_follow_unix_numbering() {
		// Friday 2026-01-16; Unix weekday 1 is Monday
		let after = Utc.with_ymd_and_hms(2026, 1, 16, 12, 0, 0).unwrap();

		let next = calculate_next_run("0 9 * * 1", after).unwrap();

		assert_eq!(next.weekday(), Weekday::Mon);
		assert_eq!(next.date_naive().to_string(), "2026-01-19");
	}

	#[test]
	fn invalid_expression_is_an_error() {
		let after = Utc::now();
		let result = calculate_next_run("invalid cron", after);
		assert!(matches!(
			result,
			Err(CronsServerError::InvalidCronExpression(_))
		));
	}

	#[test]
	fn validate_accepts_encoder_output() {
		assert!(validate_cron_expression("0 0 * * *").is_ok());
		assert!(validate_cron_expression("*/15 * * * *").is_ok());
		assert!(validate_cron_expression("* * * * *").is_ok());
		assert!(validate_cron_expression("0 9 * * 0").is_ok()); // Sunday
		assert!(validate_cron_expression("00 09 * * 6").is_ok()); // zero-padded form fields
	}

	#[test]
	fn validate_rejects_garbage() {
		assert!(validate_cron_expression("invalid").is_err());
		assert!(validate_cron_expression("60 0 * * *").is_err()); // minute > 59
		assert!(validate_cron_expression("99 25 * * *").is_err()); // unreachable wall-clock time
		assert!(validate_cron_expression("0 9 * * 9").is_err()); // weekday out of range
		assert!(validate_cron_expression("* * * *").is_err()); // missing field
	}
}
