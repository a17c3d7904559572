// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::FlagState;

/// Declared set of features and the state each one is created with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureManifest {
	features: BTreeMap<String, FlagState>,
}

impl FeatureManifest {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_feature(mut self, name: impl Into<String>, state: FlagState) -> Self {
		self.features.insert(name.into(), state);
		self
	}

	pub fn insert(&mut self, name: impl Into<String>, state: FlagState) {
		self.features.insert(name.into(), state);
	}

	pub fn contains(&self, name: &str) -> bool {
		self.features.contains_key(name)
	}

	pub fn get(&self, name: &str) -> Option<FlagState> {
		self.features.get(name).copied()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, FlagState)> {
		self.features.iter().map(|(name, state)| (name.as_str(), *state))
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.features.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.features.len()
	}

	pub fn is_empty(&self) -> bool {
		self.features.is_empty()
	}
}

impl<N: Into<String>> FromIterator<(N, FlagState)> for FeatureManifest {
	fn from_iter<I: IntoIterator<Item = (N, FlagState)>>(iter: I) -> Self {
		Self {
			features: iter.into_iter().map(|(n, s)| (n.into(), s)).collect(),
		}
	}
}

/// Forces every newly synced flag into a fixed state in selected environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentOverride {
	pub is_active: bool,
	pub override_state: FlagState,
}

impl EnvironmentOverride {
	/// An override that never applies.
	pub fn inactive() -> Self {
		Self {
			is_active: false,
			override_state: FlagState::On,
		}
	}

	/// Active when `current` is listed in `always_on`.
	pub fn from_environment<S: AsRef<str>>(current: &str, always_on: &[S]) -> Self {
		Self {
			is_active: always_on.iter().any(|env| env.as_ref() == current),
			override_state: FlagState::On,
		}
	}

	/// The state a newly created flag receives.
	pub fn state_for(&self, declared: FlagState) -> FlagState {
		if self.is_active {
			self.override_state
		} else {
			declared
		}
	}
}

impl Default for EnvironmentOverride {
	fn default() -> Self {
		Self::inactive()
	}
}
