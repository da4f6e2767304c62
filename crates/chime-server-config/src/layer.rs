// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The merged configuration layer, one optional section per concern.

use serde::Deserialize;

use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, LoggingConfigLayer, OAuthConfigLayer,
	PathsConfigLayer,
};

/// A partial server configuration as produced by one source.
///
/// Sources are merged in precedence order; later (higher-precedence)
/// values win field by field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub auth: Option<AuthConfigLayer>,
	#[serde(default)]
	pub oauth: Option<OAuthConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub paths: Option<PathsConfigLayer>,
}

impl ServerConfigLayer {
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_section(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_section(&mut self.auth, other.auth, AuthConfigLayer::merge);
		merge_section(&mut self.oauth, other.oauth, OAuthConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		merge_section(&mut self.paths, other.paths, PathsConfigLayer::merge);
	}
}

fn merge_section<T>(mine: &mut Option<T>, theirs: Option<T>, merge: fn(&mut T, T)) {
	match (mine.as_mut(), theirs) {
		(Some(m), Some(t)) => merge(m, t),
		(None, Some(t)) => *mine = Some(t),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn later_layer_wins_field_by_field() {
		let mut base = ServerConfigLayer {
			http: Some(HttpConfigLayer {
				host: Some("127.0.0.1".to_string()),
				port: Some(8080),
				base_url: None,
			}),
			..Default::default()
		};

		base.merge(ServerConfigLayer {
			http: Some(HttpConfigLayer {
				host: None,
				port: Some(9000),
				base_url: None,
			}),
			..Default::default()
		});

		let http = base.http.unwrap().finalize();
		assert_eq!(http.host, "127.0.0.1");
		assert_eq!(http.port, 9000);
	}

	#[test]
	fn absent_sections_are_adopted() {
		let mut base = ServerConfigLayer::default();
		base.merge(ServerConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: Some("sqlite:custom.db".to_string()),
			}),
			..Default::default()
		});
		assert_eq!(
			base.database.unwrap().finalize().url,
			"sqlite:custom.db"
		);
	}
}
