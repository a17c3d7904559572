// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deployment environment and the always-on override list.

use serde::{Deserialize, Serialize};
use switchyard_flags_core::EnvironmentOverride;

const DEFAULT_ENVIRONMENT: &str = "production";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentConfigLayer {
	pub name: Option<String>,
	/// Environments in which newly synced features are created `on`.
	pub always_on: Option<Vec<String>>,
}

impl EnvironmentConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.name.is_some() {
			self.name = other.name;
		}
		if other.always_on.is_some() {
			self.always_on = other.always_on;
		}
	}

	pub fn finalize(self) -> EnvironmentConfig {
		EnvironmentConfig {
			name: self.name.unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
			always_on: self.always_on.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentConfig {
	pub name: String,
	pub always_on: Vec<String>,
}

impl EnvironmentConfig {
	/// The sync override for the current environment.
	pub fn sync_override(&self) -> EnvironmentOverride {
		EnvironmentOverride::from_environment(&self.name, &self.always_on)
	}
}

impl Default for EnvironmentConfig {
	fn default() -> Self {
		Self {
			name: DEFAULT_ENVIRONMENT.to_string(),
			always_on: Vec::new(),
		}
	}
}

/// Splits a comma separated list, dropping blanks.
pub(crate) fn parse_list(raw: &str) -> Vec<String> {
	raw.split(',')
		.map(|s| s.trim().to_string())
		.filter(|s| !s.is_empty())
		.collect()
}
