// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FlagsError;
use crate::state::FlagState;

/// A named, persisted feature flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
	/// Unique and immutable after creation.
	pub name: String,
	pub state: FlagState,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Flag {
	/// Builds a new record, rejecting empty names.
	pub fn new(name: impl Into<String>, state: FlagState) -> Result<Self, FlagsError> {
		let name = name.into();
		if !Self::validate_name(&name) {
			return Err(FlagsError::InvalidFlagName(name));
		}

		let now = Utc::now();
		Ok(Self {
			name,
			state,
			created_at: now,
			updated_at: now,
		})
	}

	/// Names must be non-empty and may not contain control characters or
	/// surrounding whitespace.
	pub fn validate_name(name: &str) -> bool {
		!name.is_empty() && name.trim() == name && !name.chars().any(char::is_control)
	}

	pub fn is_on(&self) -> bool {
		self.state == FlagState::On
	}

	pub fn is_dynamic(&self) -> bool {
		self.state == FlagState::Dynamic
	}
}
