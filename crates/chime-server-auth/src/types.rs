// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for authentication.
//!
//! ID newtypes are type-safe wrappers around UUIDs preventing accidental
//! mixing; all of them serialize transparently as UUID strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(SessionId, "Unique identifier for a session.");

/// A dashboard user account, provisioned on first OAuth sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub email: String,
	pub display_name: String,
	/// Stable subject identifier from the identity provider.
	pub google_sub: String,
	pub created_at: DateTime<Utc>,
}

/// A server-side session backing a session cookie.
///
/// An expired session is treated exactly like an absent one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
	pub id: SessionId,
	pub user_id: UserId,
	pub created_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

impl Session {
	/// Whether the session is still usable at the given instant.
	pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
		self.expires_at > now
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn user_id_display_parses_back(uuid_bytes in any::<[u8; 16]>()) {
			let id = UserId::new(Uuid::from_bytes(uuid_bytes));
			let parsed = UserId::new(Uuid::parse_str(&id.to_string()).unwrap());
			prop_assert_eq!(id, parsed);
		}
	}

	#[test]
	fn session_validity_is_strict() {
		let now = Utc::now();
		let session = Session {
			id: SessionId::generate(),
			user_id: UserId::generate(),
			created_at: now - Duration::hours(1),
			expires_at: now,
		};
		assert!(!session.is_valid_at(now));
		assert!(session.is_valid_at(now - Duration::seconds(1)));
	}
}
