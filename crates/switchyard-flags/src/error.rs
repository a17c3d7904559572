// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use switchyard_flags_core::FlagsError;
use thiserror::Error;

/// Errors raised by the evaluation engine and its store/cache adapters.
#[derive(Debug, Error)]
pub enum FlagsServerError {
	#[error(transparent)]
	Core(#[from] FlagsError),

	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	/// Raised by external cache backends; the in-memory cache never fails.
	#[error("cache error: {0}")]
	Cache(String),

	#[error("unknown cache store: {0}")]
	UnknownCacheStore(String),

	/// A store or cache call failed part way through a sync.
	#[error("sync aborted after creating {created:?} and deleting {deleted:?}")]
	SyncAborted {
		created: Vec<String>,
		deleted: Vec<String>,
		#[source]
		source: Box<FlagsServerError>,
	},

	#[error("internal error: {0}")]
	Internal(String),
}

impl FlagsServerError {
	/// True for the error a request guard should turn into a server error.
	pub fn is_missing_feature(&self) -> bool {
		matches!(self, FlagsServerError::Core(e) if e.is_missing_feature())
	}

	pub fn is_invalid_state(&self) -> bool {
		matches!(self, FlagsServerError::Core(FlagsError::InvalidState(_)))
	}
}

pub type Result<T> = std::result::Result<T, FlagsServerError>;
