// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session persistence.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::instrument;
use uuid::Uuid;

use chime_server_auth::{Session, SessionId, UserId};

use crate::error::{DbError, Result};

/// Repository for session rows backing the session cookie.
#[derive(Debug, Clone)]
pub struct SessionRepository {
	pool: SqlitePool,
}

impl SessionRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a session for a user with the given lifetime.
	#[instrument(skip(self), fields(user_id = %user_id))]
	pub async fn create(&self, user_id: UserId, ttl_secs: u64) -> Result<Session> {
		let now = Utc::now();
		let session = Session {
			id: SessionId::generate(),
			user_id,
			created_at: now,
			expires_at: now + Duration::seconds(ttl_secs as i64),
		};

		sqlx::query(
			r#"
			INSERT INTO sessions (id, user_id, created_at, expires_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(session.id.to_string())
		.bind(session.user_id.to_string())
		.bind(session.created_at.to_rfc3339())
		.bind(session.expires_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(session)
	}

	/// Look up a session that has not expired yet.
	#[instrument(skip(self), fields(session_id = %id))]
	pub async fn get_valid(&self, id: SessionId) -> Result<Option<Session>> {
		let row = sqlx::query_as::<_, SessionRow>(
			r#"
			SELECT id, user_id, created_at, expires_at
			FROM sessions
			WHERE id = ? AND expires_at > ?
			"#,
		)
		.bind(id.to_string())
		.bind(Utc::now().to_rfc3339())
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	/// Delete a session (sign-out).
	#[instrument(skip(self), fields(session_id = %id))]
	pub async fn delete(&self, id: SessionId) -> Result<bool> {
		let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	/// Delete every expired session. Returns the number removed.
	#[instrument(skip(self))]
	pub async fn cleanup_expired(&self) -> Result<u64> {
		let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
			.bind(Utc::now().to_rfc3339())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected())
	}
}

#[derive(sqlx::FromRow)]
struct SessionRow {
	id: String,
	user_id: String,
	created_at: String,
	expires_at: String,
}

impl TryFrom<SessionRow> for Session {
	type Error = DbError;

	fn try_from(row: SessionRow) -> Result<Self> {
		Ok(Session {
			id: Uuid::parse_str(&row.id)
				.map(SessionId::new)
				.map_err(|_| DbError::Internal("Invalid session ID".to_string()))?,
			user_id: Uuid::parse_str(&row.user_id)
				.map(UserId::new)
				.map_err(|_| DbError::Internal("Invalid user ID".to_string()))?,
			created_at: chrono::DateTime::parse_from_rfc3339(&row.created_at)
				.map_err(|_| DbError::Internal("Invalid created_at".to_string()))?
				.with_timezone(&chrono::Utc),
			expires_at: chrono::DateTime::parse_from_rfc3339(&row.expires_at)
				.map_err(|_| DbError::Internal("Invalid expires_at".to_string()))?
				.with_timezone(&chrono::Utc),
		})
	}
}
