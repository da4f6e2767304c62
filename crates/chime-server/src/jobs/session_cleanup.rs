// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Periodic sweep of expired sessions.

use std::sync::Arc;
use std::time::Duration;

use chime_server_db::SessionRepository;
use tokio::task::JoinHandle;
use tracing::instrument;

/// Spawn the expired-session sweep on the given interval.
pub fn spawn_session_cleanup(
	session_repo: Arc<SessionRepository>,
	interval: Duration,
) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(interval);
		ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
		loop {
			ticker.tick().await;
			run_once(&session_repo).await;
		}
	})
}

#[instrument(skip(session_repo), fields(job = "session-cleanup"))]
async fn run_once(session_repo: &SessionRepository) {
	match session_repo.cleanup_expired().await {
		Ok(0) => {}
		Ok(deleted) => tracing::info!(deleted, "expired sessions deleted"),
		Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
	}
}
