// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! In-memory store for OAuth CSRF state tokens.
//!
//! Each login redirect mints a one-time state token; the callback consumes
//! it. Tokens expire after a short TTL and a background job sweeps leftovers
//! from abandoned login attempts.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Default lifetime of an outstanding state token.
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// One-time CSRF state tokens for in-flight OAuth logins.
pub struct OAuthStateStore {
	states: Mutex<HashMap<String, Instant>>,
	ttl: Duration,
}

impl OAuthStateStore {
	pub fn new(ttl: Duration) -> Self {
		Self {
			states: Mutex::new(HashMap::new()),
			ttl,
		}
	}

	/// Mint and record a fresh state token.
	pub async fn issue(&self) -> String {
		let state = Uuid::new_v4().to_string();
		self.states
			.lock()
			.await
			.insert(state.clone(), Instant::now() + self.ttl);
		state
	}

	/// Consume a state token. Returns true exactly once per issued,
	/// unexpired token.
	pub async fn consume(&self, state: &str) -> bool {
		match self.states.lock().await.remove(state) {
			Some(expires_at) => expires_at > Instant::now(),
			None => false,
		}
	}

	/// Drop expired tokens. Returns the number removed.
	pub async fn cleanup_expired(&self) -> usize {
		let mut states = self.states.lock().await;
		let before = states.len();
		let now = Instant::now();
		states.retain(|_, expires_at| *expires_at > now);
		before - states.len()
	}
}

impl Default for OAuthStateStore {
	fn default() -> Self {
		Self::new(DEFAULT_STATE_TTL)
	}
}
