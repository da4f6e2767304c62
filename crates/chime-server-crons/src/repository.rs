// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository layer for project, job, and execution log database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::instrument;

use chime_crons_core::{
	CronJob, CronJobId, ExecutionLog, ExecutionLogId, HttpMethod, OwnerId, Project, ProjectId,
};

use crate::error::{CronsServerError, Result};

/// Repository trait for dashboard persistence.
#[async_trait]
pub trait CronsRepository: Send + Sync {
	// Project operations
	async fn create_project(&self, project: &Project) -> Result<()>;
	async fn get_project_by_id(&self, id: ProjectId) -> Result<Option<Project>>;
	/// Projects for an owner, oldest first.
	async fn list_projects(&self, owner: OwnerId) -> Result<Vec<Project>>;

	// Job operations
	async fn create_job(&self, job: &CronJob) -> Result<()>;
	async fn get_job_by_id(&self, id: CronJobId) -> Result<Option<CronJob>>;
	/// Jobs in a project, newest first.
	async fn list_jobs(&self, project_id: ProjectId) -> Result<Vec<CronJob>>;
	async fn delete_job(&self, id: CronJobId) -> Result<bool>;

	// Execution log operations
	async fn create_log(&self, log: &ExecutionLog) -> Result<()>;
	/// Logs for a job, newest first.
	async fn list_logs(&self, job_id: CronJobId, limit: u32) -> Result<Vec<ExecutionLog>>;

	// Executor state updates
	async fn update_job_run_times(
		&self,
		id: CronJobId,
		last_run_at: DateTime<Utc>,
		next_run_at: Option<DateTime<Utc>>,
	) -> Result<()>;
}

/// SQLite implementation of the crons repository.
#[derive(Clone)]
pub struct SqliteCronsRepository {
	pool: SqlitePool,
}

impl SqliteCronsRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl CronsRepository for SqliteCronsRepository {
	#[instrument(skip(self, project), fields(project_id = %project.id, owner = %project.owner))]
	async fn create_project(&self, project: &Project) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO projects (id, owner, name, description, created_at)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(project.id.0.to_string())
		.bind(project.owner.0.to_string())
		.bind(&project.name)
		.bind(&project.description)
		.bind(project.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[instrument(skip(self), fields(project_id = %id))]
	async fn get_project_by_id(&self, id: ProjectId) -> Result<Option<Project>> {
		let row = sqlx::query_as::<_, ProjectRow>(
			r#"
			SELECT id, owner, name, description, created_at
			FROM projects
			WHERE id = ?
			"#,
		)
		.bind(id.0.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self), fields(owner = %owner))]
	async fn list_projects(&self, owner: OwnerId) -> Result<Vec<Project>> {
		let rows = sqlx::query_as::<_, ProjectRow>(
			r#"
			SELECT id, owner, name, description, created_at
			FROM projects
			WHERE owner = ?
			ORDER BY created_at ASC
			"#,
		)
		.bind(owner.0.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	#[instrument(skip(self, job), fields(job_id = %job.id, project_id = %job.project_id))]
	async fn create_job(&self, job: &CronJob) -> Result<()> {
		let headers_json = job
			.request_headers
			.as_ref()
			.map(serde_json::to_string)
			.transpose()?;
		let body_json = job
			.request_body
			.as_ref()
			.map(serde_json::to_string)
			.transpose()?;

		sqlx::query(
			r#"
			INSERT INTO cron_jobs (
				id, project_id, name, target_url, http_method,
				cron_expression, request_headers, request_body,
				is_active, last_run_at, next_run_at, created_at
			)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(job.id.0.to_string())
		.bind(job.project_id.0.to_string())
		.bind(&job.name)
		.bind(&job.target_url)
		.bind(job.http_method.to_string())
		.bind(&job.cron_expression)
		.bind(headers_json)
		.bind(body_json)
		.bind(job.is_active)
		.bind(job.last_run_at.map(|dt| dt.to_rfc3339()))
		.bind(job.next_run_at.map(|dt| dt.to_rfc3339()))
		.bind(job.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[instrument(skip(self), fields(job_id = %id))]
	async fn get_job_by_id(&self, id: CronJobId) -> Result<Option<CronJob>> {
		let row = sqlx::query_as::<_, CronJobRow>(
			r#"
			SELECT id, project_id, name, target_url, http_method,
				   cron_expression, request_headers, request_body,
				   is_active, last_run_at, next_run_at, created_at
			FROM cron_jobs
			WHERE id = ?
			"#,
		)
		.bind(id.0.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self), fields(project_id = %project_id))]
	async fn list_jobs(&self, project_id: ProjectId) -> Result<Vec<CronJob>> {
		let rows = sqlx::query_as::<_, CronJobRow>(
			r#"
			SELECT id, project_id, name, target_url, http_method,
				   cron_expression, request_headers, request_body,
				   is_active, last_run_at, next_run_at, created_at
			FROM cron_jobs
			WHERE project_id = ?
			ORDER BY created_at DESC
			"#,
		)
		.bind(project_id.0.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	#[instrument(skip(self), fields(job_id = %id))]
	async fn delete_job(&self, id: CronJobId) -> Result<bool> {
		let result = sqlx::query("DELETE FROM cron_jobs WHERE id = ?")
			.bind(id.0.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	#[instrument(skip(self, log), fields(log_id = %log.id, job_id = %log.cron_job_id))]
	async fn create_log(&self, log: &ExecutionLog) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO execution_logs (
				id, cron_job_id, executed_at,
				status_code, is_success, attempt_number, duration_ms,
				error_message, response_body
			)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(log.id.0.to_string())
		.bind(log.cron_job_id.0.to_string())
		.bind(log.executed_at.to_rfc3339())
		.bind(log.status_code as i32)
		.bind(log.is_success)
		.bind(log.attempt_number as i32)
		.bind(log.duration_ms as i64)
		.bind(&log.error_message)
		.bind(&log.response_body)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[instrument(skip(self), fields(job_id = %job_id))]
	async fn list_logs(&self, job_id: CronJobId, limit: u32) -> Result<Vec<ExecutionLog>> {
		let rows = sqlx::query_as::<_, ExecutionLogRow>(
			r#"
			SELECT id, cron_job_id, executed_at,
				   status_code, is_success, attempt_number, duration_ms,
				   error_message, response_body
			FROM execution_logs
			WHERE cron_job_id = ?
			ORDER BY executed_at DESC
			LIMIT ?
			"#,
		)
		.bind(job_id.0.to_string())
		.bind(limit as i64)
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}

	#[instrument(skip(self), fields(job_id = %id))]
	async fn update_job_run_times(
		&self,
		id: CronJobId,
		last_run_at: DateTime<Utc>,
		next_run_at: Option<DateTime<Utc>>,
	) -> Result<()> {
		sqlx::query(
			r#"
			UPDATE cron_jobs
			SET last_run_at = ?, next_run_at = ?
			WHERE id = ?
			"#,
		)
		.bind(last_run_at.to_rfc3339())
		.bind(next_run_at.map(|dt| dt.to_rfc3339()))
		.bind(id.0.to_string())
		.execute(&self.pool)
		.await?;

		Ok(())
	}
}

// Database row types for sqlx

#[derive(sqlx::FromRow)]
struct ProjectRow {
	id: String,
	owner: String,
	name: String,
	description: String,
	created_at: String,
}

impl TryFrom<ProjectRow> for Project {
	type Error = CronsServerError;

	fn try_from(row: ProjectRow) -> Result<Self> {
		Ok(Project {
			id: row
				.id
				.parse()
				.map_err(|_| CronsServerError::Internal("Invalid project ID".to_string()))?,
			owner: row
				.owner
				.parse()
				.map_err(|_| CronsServerError::Internal("Invalid owner ID".to_string()))?,
			name: row.name,
			description: row.description,
			created_at: parse_timestamp(&row.created_at, "created_at")?,
		})
	}
}

#[derive(sqlx::FromRow)]
struct CronJobRow {
	id: String,
	project_id: String,
	name: String,
	target_url: String,
	http_method: String,
	cron_expression: String,
	request_headers: Option<String>,
	request_body: Option<String>,
	is_active: bool,
	last_run_at: Option<String>,
	next_run_at: Option<String>,
	created_at: String,
}

impl TryFrom<CronJobRow> for CronJob {
	type Error = CronsServerError;

	fn try_from(row: CronJobRow) -> Result<Self> {
		let request_headers: Option<BTreeMap<String, String>> = row
			.request_headers
			.as_deref()
			.map(serde_json::from_str)
			.transpose()?;
		let request_body: Option<BTreeMap<String, String>> = row
			.request_body
			.as_deref()
			.map(serde_json::from_str)
			.transpose()?;

		Ok(CronJob {
			id: row
				.id
				.parse()
				.map_err(|_| CronsServerError::Internal("Invalid job ID".to_string()))?,
			project_id: row
				.project_id
				.parse()
				.map_err(|_| CronsServerError::Internal("Invalid project ID".to_string()))?,
			name: row.name,
			target_url: row.target_url,
			http_method: row
				.http_method
				.parse::<HttpMethod>()
				.map_err(CronsServerError::Internal)?,
			cron_expression: row.cron_expression,
			request_headers,
			request_body,
			is_active: row.is_active,
			last_run_at: row
				.last_run_at
				.as_deref()
				.map(|s| parse_timestamp(s, "last_run_at"))
				.transpose()?,
			next_run_at: row
				.next_run_at
				.as_deref()
				.map(|s| parse_timestamp(s, "next_run_at"))
				.transpose()?,
			created_at: parse_timestamp(&row.created_at, "created_at")?,
		})
	}
}

#[derive(sqlx::FromRow)]
struct ExecutionLogRow {
	id: String,
	cron_job_id: String,
	executed_at: String,
	status_code: i32,
	is_success: bool,
	attempt_number: i32,
	duration_ms: i64,
	error_message: Option<String>,
	response_body: Option<String>,
}

impl TryFrom<ExecutionLogRow> for ExecutionLog {
	type Error = CronsServerError;

	fn try_from(row: ExecutionLogRow) -> Result<Self> {
		Ok(ExecutionLog {
			id: row
				.id
				.parse()
				.map_err(|_| CronsServerError::Internal("Invalid log ID".to_string()))?,
			cron_job_id: row
				.cron_job_id
				.parse()
				.map_err(|_| CronsServerError::Internal("Invalid job ID".to_string()))?,
			executed_at: parse_timestamp(&row.executed_at, "executed_at")?,
			status_code: row.status_code as u16,
			is_success: row.is_success,
			attempt_number: row.attempt_number as u32,
			duration_ms: row.duration_ms as u64,
			error_message: row.error_message,
			response_body: row.response_body,
		})
	}
}

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
	chrono::DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|_| CronsServerError::Internal(format!("Invalid {}", column)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Duration, TimeZone};
	use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
	use std::str::FromStr;
	use uuid::Uuid;

	async fn setup() -> (SqliteCronsRepository, OwnerId, tempfile::TempDir) {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("crons.db");
		let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
			.unwrap()
			.journal_mode(SqliteJournalMode::Wal)
			.foreign_keys(true)
			.create_if_missing(true);
		let pool = SqlitePool::connect_with(options).await.unwrap();

		// The server applies the full schema at startup; tests recreate the
		// tables this repository touches, including the owning user row.
		sqlx::query(
			r#"
			CREATE TABLE users (
				id TEXT PRIMARY KEY,
				email TEXT NOT NULL,
				display_name TEXT NOT NULL,
				google_sub TEXT NOT NULL UNIQUE,
				created_at TEXT NOT NULL
			)
			"#,
		)
		.execute(&pool)
		.await
		.unwrap();
		sqlx::query(
			r#"
			CREATE TABLE projects (
				id TEXT PRIMARY KEY,
				owner TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
				name TEXT NOT NULL,
				description TEXT NOT NULL,
				created_at TEXT NOT NULL
			)
			"#,
		)
		.execute(&pool)
		.await
		.unwrap();
		sqlx::query(
			r#"
			CREATE TABLE cron_jobs (
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
			)
			"#,
		)
		.execute(&pool)
		.await
		.unwrap();
		sqlx::query(
			r#"
			CREATE TABLE execution_logs (
				id TEXT PRIMARY KEY,
				cron_job_id TEXT NOT NULL REFERENCES cron_jobs(id) ON DELETE CASCADE,
				executed_at TEXT NOT NULL,
				status_code INTEGER NOT NULL,
				is_success INTEGER NOT NULL,
				attempt_number INTEGER NOT NULL,
				duration_ms INTEGER NOT NULL,
				error_message TEXT,
				response_body TEXT
			)
			"#,
		)
		.execute(&pool)
		.await
		.unwrap();

		let owner = OwnerId(Uuid::new_v4());
		sqlx::query(
			"INSERT INTO users (id, email, display_name, google_sub, created_at) VALUES (?, ?, ?, ?, ?)",
		)
		.bind(owner.0.to_string())
		.bind("owner@example.com")
		.bind("Owner")
		.bind("sub-owner")
		.bind(Utc::now().to_rfc3339())
		.execute(&pool)
		.await
		.unwrap();

		(SqliteCronsRepository::new(pool), owner, dir)
	}

	fn project_at(owner: OwnerId, name: &str, created_at: DateTime<Utc>) -> Project {
		Project {
			id: ProjectId::new(),
			owner,
			name: name.to_string(),
			description: format!("{} description", name),
			created_at,
		}
	}

	fn job_at(project_id: ProjectId, name: &str, created_at: DateTime<Utc>) -> CronJob {
		CronJob {
			id: CronJobId::new(),
			project_id,
			name: name.to_string(),
			target_url: "https://example.com/hook".to_string(),
			http_method: HttpMethod::Get,
			cron_expression: "*/15 * * * *".to_string(),
			request_headers: None,
			request_body: None,
			is_active: true,
			last_run_at: None,
			next_run_at: Some(created_at),
			created_at,
		}
	}

	#[tokio::test]
	async fn projects_list_oldest_first() {
		let (repo, owner, _dir) = setup().await;
		let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

		let newer = project_at(owner, "newer", base + Duration::hours(2));
		let older = project_at(owner, "older", base);
		repo.create_project(&newer).await.unwrap();
		repo.create_project(&older).await.unwrap();

		let listed = repo.list_projects(owner).await.unwrap();
		assert_eq!(listed.len(), 2);
		assert_eq!(listed[0].name, "older");
		assert_eq!(listed[1].name, "newer");
	}

	#[tokio::test]
	async fn projects_are_scoped_to_their_owner() {
		let (repo, owner, _dir) = setup().await;
		let project = project_at(owner, "mine", Utc::now());
		repo.create_project(&project).await.unwrap();

		assert_eq!(repo.list_projects(owner).await.unwrap().len(), 1);
		assert!(repo
			.list_projects(OwnerId(Uuid::new_v4()))
			.await
			.unwrap()
			.is_empty());

		let fetched = repo.get_project_by_id(project.id).await.unwrap().unwrap();
		assert_eq!(fetched.owner, owner);
	}

	#[tokio::test]
	async fn jobs_list_newest_first() {
		let (repo, owner, _dir) = setup().await;
		let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
		let project = project_at(owner, "p", base);
		repo.create_project(&project).await.unwrap();

		let older = job_at(project.id, "older", base);
		let newer = job_at(project.id, "newer", base + Duration::hours(1));
		repo.create_job(&older).await.unwrap();
		repo.create_job(&newer).await.unwrap();

		let listed = repo.list_jobs(project.id).await.unwrap();
		assert_eq!(listed.len(), 2);
		assert_eq!(listed[0].name, "newer");
		assert_eq!(listed[1].name, "older");
	}

	#[tokio::test]
	async fn header_and_body_maps_survive_storage() {
		let (repo, owner, _dir) = setup().await;
		let project = project_at(owner, "p", Utc::now());
		repo.create_project(&project).await.unwrap();

		let mut headers = BTreeMap::new();
		headers.insert("X-Token".to_string(), "abc".to_string());
		let mut body = BTreeMap::new();
		body.insert("payload".to_string(), "42".to_string());

		let mut job = job_at(project.id, "with-maps", Utc::now());
		job.http_method = HttpMethod::Post;
		job.request_headers = Some(headers.clone());
		job.request_body = Some(body.clone());
		repo.create_job(&job).await.unwrap();

		let fetched = repo.get_job_by_id(job.id).await.unwrap().unwrap();
		assert_eq!(fetched.http_method, HttpMethod::Post);
		assert_eq!(fetched.request_headers, Some(headers));
		assert_eq!(fetched.request_body, Some(body));
	}

	#[tokio::test]
	async fn absent_maps_stay_absent() {
		let (repo, owner, _dir) = setup().await;
		let project = project_at(owner, "p", Utc::now());
		repo.create_project(&project).await.unwrap();

		let job = job_at(project.id, "bare", Utc::now());
		repo.create_job(&job).await.unwrap();

		let fetched = repo.get_job_by_id(job.id).await.unwrap().unwrap();
		assert_eq!(fetched.request_headers, None);
		assert_eq!(fetched.request_body, None);
	}

	#[tokio::test]
	async fn deleting_a_job_cascades_to_its_logs() {
		let (repo, owner, _dir) = setup().await;
		let project = project_at(owner, "p", Utc::now());
		repo.create_project(&project).await.unwrap();
		let job = job_at(project.id, "doomed", Utc::now());
		repo.create_job(&job).await.unwrap();

		let log = ExecutionLog {
			id: ExecutionLogId::new(),
			cron_job_id: job.id,
			executed_at: Utc::now(),
			status_code: 200,
			is_success: true,
			attempt_number: 1,
			duration_ms: 12,
			error_message: None,
			response_body: None,
		};
		repo.create_log(&log).await.unwrap();

		assert!(repo.delete_job(job.id).await.unwrap());
		assert!(repo.get_job_by_id(job.id).await.unwrap().is_none());
		assert!(repo.list_logs(job.id, 50).await.unwrap().is_empty());
		assert!(!repo.delete_job(job.id).await.unwrap());
	}

	#[tokio::test]
	async fn logs_list_newest_first_with_limit() {
		let (repo, owner, _dir) = setup().await;
		let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
		let project = project_at(owner, "p", base);
		repo.create_project(&project).await.unwrap();
		let job = job_at(project.id, "j", base);
		repo.create_job(&job).await.unwrap();

		for i in 0..3 {
			let log = ExecutionLog {
				id: ExecutionLogId::new(),
				cron_job_id: job.id,
				executed_at: base + Duration::minutes(i),
				status_code: 200,
				is_success: true,
				attempt_number: 1,
				duration_ms: i as u64,
				error_message: None,
				response_body: None,
			};
			repo.create_log(&log).await.unwrap();
		}

		let logs = repo.list_logs(job.id, 2).await.unwrap();
		assert_eq!(logs.len(), 2);
		assert_eq!(logs[0].duration_ms, 2);
		assert_eq!(logs[1].duration_ms, 1);
	}

	#[tokio::test]
	async fn run_times_advance_only_via_executor_update() {
		let (repo, owner, _dir) = setup().await;
		let project = project_at(owner, "p", Utc::now());
		repo.create_project(&project).await.unwrap();
		let job = job_at(project.id, "j", Utc::now());
		repo.create_job(&job).await.unwrap();

		let executed = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
		let next = executed + Duration::minutes(15);
		repo.update_job_run_times(job.id, executed, Some(next))
			.await
			.unwrap();

		let fetched = repo.get_job_by_id(job.id).await.unwrap().unwrap();
		assert_eq!(fetched.last_run_at, Some(executed));
		assert_eq!(fetched.next_run_at, Some(next));
	}
}
