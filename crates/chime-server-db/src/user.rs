// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User persistence.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::instrument;
use uuid::Uuid;

use chime_server_auth::{User, UserId};

use crate::error::{DbError, Result};

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Find or create the account for a Google identity.
	///
	/// The Google subject is the stable key; email and display name are
	/// refreshed on every sign-in.
	#[instrument(skip(self), fields(google_sub = %google_sub))]
	pub async fn upsert_google_user(
		&self,
		google_sub: &str,
		email: &str,
		display_name: &str,
	) -> Result<User> {
		if let Some(existing) = self.get_by_google_sub(google_sub).await? {
			sqlx::query(
				r#"
				UPDATE users
				SET email = ?, display_name = ?
				WHERE id = ?
				"#,
			)
			.bind(email)
			.bind(display_name)
			.bind(existing.id.to_string())
			.execute(&self.pool)
			.await?;

			return Ok(User {
				email: email.to_string(),
				display_name: display_name.to_string(),
				..existing
			});
		}

		let user = User {
			id: UserId::generate(),
			email: email.to_string(),
			display_name: display_name.to_string(),
			google_sub: google_sub.to_string(),
			created_at: Utc::now(),
		};

		sqlx::query(
			r#"
			INSERT INTO users (id, email, display_name, google_sub, created_at)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(user.id.to_string())
		.bind(&user.email)
		.bind(&user.display_name)
		.bind(&user.google_sub)
		.bind(user.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::info!(user_id = %user.id, "user provisioned");
		Ok(user)
	}

	#[instrument(skip(self), fields(user_id = %id))]
	pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
		let row = sqlx::query_as::<_, UserRow>(
			r#"
			SELECT id, email, display_name, google_sub, created_at
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self), fields(google_sub = %google_sub))]
	pub async fn get_by_google_sub(&self, google_sub: &str) -> Result<Option<User>> {
		let row = sqlx::query_as::<_, UserRow>(
			r#"
			SELECT id, email, display_name, google_sub, created_at
			FROM users
			WHERE google_sub = ?
			"#,
		)
		.bind(google_sub)
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}
}

#[derive(sqlx::FromRow)]
struct UserRow {
	id: String,
	email: String,
	display_name: String,
	google_sub: String,
	created_at: String,
}

impl TryFrom<UserRow> for User {
	type Error = DbError;

	fn try_from(row: UserRow) -> Result<Self> {
		Ok(User {
			id: Uuid::parse_str(&row.id)
				.map(UserId::new)
				.map_err(|_| DbError::Internal("Invalid user ID".to_string()))?,
			email: row.email,
			display_name: row.display_name,
			google_sub: row.google_sub,
			created_at: chrono::DateTime::parse_from_rfc3339(&row.created_at)
				.map_err(|_| DbError::Internal("Invalid created_at".to_string()))?
				.with_timezone(&chrono::Utc),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::migrations::run_migrations;
	use crate::pool::create_pool;

	async fn setup() -> (UserRepository, tempfile::TempDir) {
		let dir = tempfile::tempdir().unwrap();
		let url = format!("sqlite:{}?mode=rwc", dir.path().join("users.db").display());
		let pool = create_pool(&url).await.unwrap();
		run_migrations(&pool).await.unwrap();
		(UserRepository::new(pool), dir)
	}

	#[tokio::test]
	async fn upsert_creates_then_reuses_account() {
		let (repo, _dir) = setup().await;

		let first = repo
			.upsert_google_user("sub-1", "a@example.com", "Ada")
			.await
			.unwrap();
		let second = repo
			.upsert_google_user("sub-1", "new@example.com", "Ada L.")
			.await
			.unwrap();

		assert_eq!(first.id, second.id);
		assert_eq!(second.email, "new@example.com");
		assert_eq!(second.display_name, "Ada L.");

		let fetched = repo.get_by_id(first.id).await.unwrap().unwrap();
		assert_eq!(fetched.email, "new@example.com");
	}

	#[tokio::test]
	async fn distinct_subjects_get_distinct_accounts() {
		let (repo, _dir) = setup().await;

		let a = repo
			.upsert_google_user("sub-a", "a@example.com", "A")
			.await
			.unwrap();
		let b = repo
			.upsert_google_user("sub-b", "b@example.com", "B")
			.await
			.unwrap();

		assert_ne!(a.id, b.id);
	}

	#[tokio::test]
	async fn unknown_user_is_none() {
		let (repo, _dir) = setup().await;
		assert!(repo.get_by_id(UserId::generate()).await.unwrap().is_none());
		assert!(repo.get_by_google_sub("nope").await.unwrap().is_none());
	}
}
