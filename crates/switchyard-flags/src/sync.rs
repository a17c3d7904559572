// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reconciles the store with a declared feature manifest.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use switchyard_flags_core::{EnvironmentOverride, FeatureManifest};

use crate::cache::FlagCache;
use crate::error::{FlagsServerError, Result};
use crate::store::FlagStore;

/// Names touched by one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
	pub created: Vec<String>,
	pub deleted: Vec<String>,
}

impl SyncReport {
	pub fn is_noop(&self) -> bool {
		self.created.is_empty() && self.deleted.is_empty()
	}
}

/// Applies a manifest to the store.
///
/// Flags present in both the manifest and the store are never touched, so
/// runtime state changes survive repeated syncs.
pub struct SyncEngine {
	store: Arc<dyn FlagStore>,
	cache: FlagCache,
}

impl SyncEngine {
	pub fn new(store: Arc<dyn FlagStore>, cache: FlagCache) -> Self {
		Self { store, cache }
	}

	/// Deletes stored flags the manifest does not declare, then creates the
	/// declared flags the store does not have.
	///
	/// On failure the names already applied are reported through
	/// [`FlagsServerError::SyncAborted`].
	#[instrument(skip(self, manifest), fields(declared = manifest.len(), always_on = env_override.is_active))]
	pub async fn sync(
		&self,
		manifest: &FeatureManifest,
		env_override: EnvironmentOverride,
	) -> Result<SyncReport> {
		let mut report = SyncReport::default();

		match self.apply(manifest, env_override, &mut report).await {
			Ok(()) => {
				info!(
					created = report.created.len(),
					deleted = report.deleted.len(),
					"Feature sync complete"
				);
				Ok(report)
			}
			Err(source) => Err(FlagsServerError::SyncAborted {
				created: report.created,
				deleted: report.deleted,
				source: Box::new(source),
			}),
		}
	}

	async fn apply(
		&self,
		manifest: &FeatureManifest,
		env_override: EnvironmentOverride,
		report: &mut SyncReport,
	) -> Result<()> {
		let stored = self.store.all().await?;
		let existing: HashSet<&str> = stored.iter().map(|flag| flag.name.as_str()).collect();

		for flag in stored.iter().filter(|flag| !manifest.contains(&flag.name)) {
			self.store.delete(&flag.name).await?;
			self.cache.invalidate(&flag.name).await?;
			info!(feature = %flag.name, "Deleted undeclared feature");
			report.deleted.push(flag.name.clone());
		}

		for (name, declared) in manifest.iter() {
			if existing.contains(name) {
				continue;
			}

			let state = env_override.state_for(declared);
			self.store.create(name, state).await?;
			info!(feature = %name, state = %state, "Created declared feature");
			report.created.push(name.to_string());
		}

		Ok(())
	}
}
