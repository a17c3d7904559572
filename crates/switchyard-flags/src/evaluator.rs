// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use tracing::{info, instrument, warn};

use switchyard_flags_core::{EvaluationContext, Flag, FlagEvent, FlagState, FlagsError};

use crate::broadcast::FlagsBroadcaster;
use crate::cache::FlagCache;
use crate::error::Result;
use crate::registry::HandlerRegistry;
use crate::store::FlagStore;

/// Evaluates feature flags and applies state changes.
///
/// The evaluation order is:
/// 1. Read the raw persisted state from the cache
/// 2. On a miss, load the record from the store and cache its state forever
/// 3. Parse the raw state (corrupt values fail with `InvalidState`)
/// 4. `on` is enabled, `off` is disabled, `dynamic` asks the handler registry
///
/// Only the persisted state is cached. Dynamic decisions depend on the
/// evaluation context and are recomputed on every call.
///
/// Cache fills are not coordinated with [`set_state`](Self::set_state). An
/// evaluation that misses the cache and loads the old record can write that
/// old state back after a concurrent `set_state` has invalidated the entry.
/// The stale entry then survives until the next mutation of that feature.
#[derive(Clone)]
pub struct FeatureEvaluator {
	store: Arc<dyn FlagStore>,
	cache: FlagCache,
	registry: Arc<HandlerRegistry>,
	events: Arc<FlagsBroadcaster>,
}

impl FeatureEvaluator {
	pub fn new(
		store: Arc<dyn FlagStore>,
		cache: FlagCache,
		registry: Arc<HandlerRegistry>,
		events: Arc<FlagsBroadcaster>,
	) -> Self {
		Self {
			store,
			cache,
			registry,
			events,
		}
	}

	pub fn cache_key(&self, feature: &str) -> String {
		self.cache.key(feature)
	}

	pub fn registry(&self) -> &Arc<HandlerRegistry> {
		&self.registry
	}

	pub fn events(&self) -> &Arc<FlagsBroadcaster> {
		&self.events
	}

	pub fn cache(&self) -> &FlagCache {
		&self.cache
	}

	/// Returns the persisted state of `feature`.
	///
	/// `None` means the feature does not exist and the missing-feature handler
	/// took care of it. Without a handler a missing feature is an error.
	#[instrument(skip(self), fields(feature = %feature))]
	pub async fn get_state(&self, feature: &str) -> Result<Option<FlagState>> {
		let raw = self
			.cache
			.get_or_compute(feature, move || async move {
				Ok(self
					.find_or_handle_missing(feature)
					.await?
					.map(|flag| flag.state.as_str().to_string()))
			})
			.await?;

		Ok(raw.map(|raw| FlagState::parse(&raw)).transpose()?)
	}

	/// Whether `feature` is enabled for `context`.
	#[instrument(skip(self, context), fields(feature = %feature))]
	pub async fn evaluate(&self, feature: &str, context: &EvaluationContext) -> Result<bool> {
		let enabled = match self.get_state(feature).await? {
			None | Some(FlagState::Off) => false,
			Some(FlagState::On) => true,
			Some(FlagState::Dynamic) => self.registry.resolve(feature, context).await,
		};

		Ok(enabled)
	}

	pub async fn is_on(&self, feature: &str, context: &EvaluationContext) -> Result<bool> {
		self.evaluate(feature, context).await
	}

	pub async fn is_off(&self, feature: &str, context: &EvaluationContext) -> Result<bool> {
		Ok(!self.evaluate(feature, context).await?)
	}

	/// Persists a new state for `feature`.
	///
	/// The cache entry is invalidated before this returns and a
	/// [`FlagEvent::FlagUpdated`] is broadcast. Returns `None` when the feature
	/// is missing and the missing-feature handler absorbed it.
	#[instrument(skip(self), fields(feature = %feature, state = %state))]
	pub async fn set_state(&self, feature: &str, state: FlagState) -> Result<Option<Flag>> {
		if self.find_or_handle_missing(feature).await?.is_none() {
			return Ok(None);
		}

		let flag = self.store.update(feature, state).await?;
		self.cache.invalidate(feature).await?;

		info!(feature = %feature, state = %state, "Feature state updated");
		self.events.broadcast(FlagEvent::flag_updated(flag.clone()));

		Ok(Some(flag))
	}

	pub async fn turn_on(&self, feature: &str) -> Result<Option<Flag>> {
		self.set_state(feature, FlagState::On).await
	}

	pub async fn turn_off(&self, feature: &str) -> Result<Option<Flag>> {
		self.set_state(feature, FlagState::Off).await
	}

	pub async fn make_dynamic(&self, feature: &str) -> Result<Option<Flag>> {
		self.set_state(feature, FlagState::Dynamic).await
	}

	async fn find_or_handle_missing(&self, feature: &str) -> Result<Option<Flag>> {
		if let Some(flag) = self.store.find_by_name(feature).await? {
			return Ok(Some(flag));
		}

		if self.registry.handle_missing(feature).await {
			warn!(feature = %feature, "Missing feature handled by missing-feature handler");
			Ok(None)
		} else {
			warn!(feature = %feature, "Missing feature");
			Err(FlagsError::MissingFeature(feature.to_string()).into())
		}
	}
}
