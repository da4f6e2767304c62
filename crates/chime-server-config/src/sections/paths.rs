// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Filesystem path configuration.

use serde::Deserialize;

/// Paths configuration (runtime, fully resolved).
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
	/// Directory of pre-built dashboard assets to serve; none disables
	/// static serving.
	pub web_dir: Option<String>,
}

/// Paths configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfigLayer {
	#[serde(default)]
	pub web_dir: Option<String>,
}

impl PathsConfigLayer {
	pub fn merge(&mut self, other: PathsConfigLayer) {
		if other.web_dir.is_some() {
			self.web_dir = other.web_dir;
		}
	}

	pub fn finalize(self) -> PathsConfig {
		PathsConfig {
			web_dir: self.web_dir,
		}
	}
}
