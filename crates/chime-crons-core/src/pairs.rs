// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Key/value pair compaction for request headers and bodies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One editable key/value row from the job form.
///
/// Blank-key rows are scratch "add another" rows and are dropped during
/// compaction rather than treated as incomplete input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct KeyValuePair {
	pub key: String,
	pub value: String,
}

impl KeyValuePair {
	pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			value: value.into(),
		}
	}
}

/// Compact pair rows into a plain mapping.
///
/// Rows whose key is blank after trimming are dropped; the raw key is kept
/// as the map key, and a later duplicate overwrites an earlier one. Returns
/// `None` rather than an empty map when nothing survives; the caller
/// persists `None` as an absent column, which is distinct from an empty
/// object.
pub fn build_object_from_pairs(pairs: &[KeyValuePair]) -> Option<BTreeMap<String, String>> {
	let mut object = BTreeMap::new();
	for pair in pairs {
		if !pair.key.trim().is_empty() {
			object.insert(pair.key.clone(), pair.value.clone());
		}
	}
	if object.is_empty() {
		None
	} else {
		Some(object)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn drops_blank_key_rows() {
		let pairs = vec![
			KeyValuePair::new("", "x"),
			KeyValuePair::new("a", "b"),
		];
		let object = build_object_from_pairs(&pairs).unwrap();
		assert_eq!(object.len(), 1);
		assert_eq!(object.get("a").map(String::as_str), Some("b"));
	}

	#[test]
	fn whitespace_only_keys_are_blank() {
		let pairs = vec![KeyValuePair::new("   ", "x"), KeyValuePair::new("a", "b")];
		let object = build_object_from_pairs(&pairs).unwrap();
		assert!(!object.contains_key("   "));
		assert!(object.contains_key("a"));
	}

	#[test]
	fn returns_none_when_nothing_survives() {
		let pairs = vec![KeyValuePair::new("", "")];
		assert_eq!(build_object_from_pairs(&pairs), None);
		assert_eq!(build_object_from_pairs(&[]), None);
	}

	#[test]
	fn later_duplicate_overwrites_earlier() {
		let pairs = vec![
			KeyValuePair::new("X-Token", "first"),
			KeyValuePair::new("X-Token", "second"),
		];
		let object = build_object_from_pairs(&pairs).unwrap();
		assert_eq!(object.get("X-Token").map(String::as_str), Some("second"));
	}

	#[test]
	fn keys_keep_their_raw_spelling() {
		let pairs = vec![KeyValuePair::new(" X-Trim ", "v")];
		let object = build_object_from_pairs(&pairs).unwrap();
		assert!(object.contains_key(" X-Trim "));
	}
}
