// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Embedded startup schema.
//!
//! Timestamps are stored as RFC 3339 TEXT; header/body maps as JSON TEXT.
//! Log rows cascade with their job, jobs with their project, projects with
//! their owner.

use sqlx::SqlitePool;

use crate::error::DbError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
	id TEXT PRIMARY KEY,
	email TEXT NOT NULL,
	display_name TEXT NOT NULL,
	google_sub TEXT NOT NULL UNIQUE,
	created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
	id TEXT PRIMARY KEY,
	user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
	created_at TEXT NOT NULL,
	expires_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);

CREATE TABLE IF NOT EXISTS projects (
	id TEXT PRIMARY KEY,
	owner TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
	name TEXT NOT NULL,
	description TEXT NOT NULL,
	created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_projects_owner ON projects(owner);

CREATE TABLE IF NOT EXISTS cron_jobs (
	id TEXT PRIMARY KEY,
	project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
	name TEXT NOT NULL,
	target_url TEXT NOT NULL,
	http_method TEXT NOT NULL,
	cron_expression TEXT NOT NULL,
	request_headers TEXT,
	request_body TEXT,
	is_active INTEGER NOT NULL DEFAULT 1,
	last_run_at TEXT,
	next_run_at TEXT,
	created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_cron_jobs_project ON cron_jobs(project_id);

CREATE TABLE IF NOT EXISTS execution_logs (
	id TEXT PRIMARY KEY,
	cron_job_id TEXT NOT NULL REFERENCES cron_jobs(id) ON DELETE CASCADE,
	executed_at TEXT NOT NULL,
	status_code INTEGER NOT NULL,
	is_success INTEGER NOT NULL,
	attempt_number INTEGER NOT NULL,
	duration_ms INTEGER NOT NULL,
	error_message TEXT,
	response_body TEXT
);

CREATE INDEX IF NOT EXISTS idx_execution_logs_job ON execution_logs(cron_job_id, executed_at);
"#;

/// Apply the embedded schema. Idempotent; runs once at startup.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	let mut tx = pool.begin().await?;
	for statement in SCHEMA.split(';') {
		let statement = statement.trim();
		if statement.is_empty() {
			continue;
		}
		sqlx::query(statement).execute(&mut *tx).await?;
	}
	tx.commit().await?;

	tracing::debug!("database schema applied");
	Ok(())
}
