// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Periodic sweep of abandoned OAuth CSRF state tokens.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::instrument;

use crate::oauth_state::OAuthStateStore;

/// Spawn the expired-state sweep on the given interval.
pub fn spawn_oauth_state_cleanup(
	store: Arc<OAuthStateStore>,
	interval: Duration,
) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut ticker = tokio::time::interval(interval);
		ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
		loop {
			ticker.tick().await;
			run_once(&store).await;
		}
	})
}

#[instrument(skip(store), fields(job = "oauth-state-cleanup"))]
async fn run_once(store: &OAuthStateStore) {
	let removed = store.cleanup_expired().await;
	if removed > 0 {
		tracing::info!(removed, "expired oauth state tokens removed");
	}
}
