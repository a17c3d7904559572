// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flag state cache configuration.

use serde::{Deserialize, Serialize};

/// Default prefix for flag state cache keys.
pub const DEFAULT_CACHE_PREFIX: &str = "features";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CacheConfigLayer {
	/// Named cache store. Unset selects the default store.
	pub store: Option<String>,
	pub prefix: Option<String>,
}

impl CacheConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.store.is_some() {
			self.store = other.store;
		}
		if other.prefix.is_some() {
			self.prefix = other.prefix;
		}
	}

	pub fn finalize(self) -> CacheConfig {
		CacheConfig {
			store: self.store,
			prefix: self
				.prefix
				.unwrap_or_else(|| DEFAULT_CACHE_PREFIX.to_string()),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
	pub store: Option<String>,
	/// May be empty, in which case keys are the bare feature name.
	pub prefix: String,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			store: None,
			prefix: DEFAULT_CACHE_PREFIX.to_string(),
		}
	}
}
