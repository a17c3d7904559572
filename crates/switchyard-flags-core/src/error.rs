// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors that can occur in the feature flags system.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlagsError {
	/// No record exists for the feature and no missing-feature handler is registered.
	#[error("missing feature: {0}")]
	MissingFeature(String),

	/// A persisted state string is not one of `on`, `off`, `dynamic`.
	#[error("invalid feature state: {0:?}")]
	InvalidState(String),

	#[error("invalid flag name: {0:?}")]
	InvalidFlagName(String),

	#[error("flag not found: {0}")]
	FlagNotFound(String),
}

impl FlagsError {
	pub fn is_missing_feature(&self) -> bool {
		matches!(self, FlagsError::MissingFeature(_))
	}
}

pub type Result<T> = std::result::Result<T, FlagsError>;
