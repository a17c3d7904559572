// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlagsError;

/// Persisted state of a feature flag.
///
/// The string forms (`"on"`, `"off"`, `"dynamic"`) are what the store and the
/// cache hold, so they must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagState {
	On,
	Off,
	/// Resolved per call by a registered dynamic handler.
	Dynamic,
}

impl FlagState {
	pub const ALL: [FlagState; 3] = [FlagState::On, FlagState::Off, FlagState::Dynamic];

	pub fn as_str(&self) -> &'static str {
		match self {
			FlagState::On => "on",
			FlagState::Off => "off",
			FlagState::Dynamic => "dynamic",
		}
	}

	/// Parses a raw persisted value. Unknown values are rejected, never coerced.
	pub fn parse(raw: &str) -> Result<Self, FlagsError> {
		match raw {
			"on" => Ok(FlagState::On),
			"off" => Ok(FlagState::Off),
			"dynamic" => Ok(FlagState::Dynamic),
			other => Err(FlagsError::InvalidState(other.to_string())),
		}
	}
}

impl fmt::Display for FlagState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for FlagState {
	type Err = FlagsError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		FlagState::parse(s)
	}
}
