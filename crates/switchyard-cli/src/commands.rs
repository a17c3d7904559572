// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Subcommand implementations.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, instrument, warn};

use switchyard_config::SwitchyardConfig;
use switchyard_flags::{
	CacheStores, EnvironmentOverride, EvaluationContext, FeatureEvaluator, FeatureManifest,
	FlagCache, FlagState, FlagStore, FlagsBroadcaster, HandlerRegistry, SqliteFlagStore,
	SyncEngine,
};

/// Wired-up engine for one CLI invocation.
pub struct App {
	store: SqliteFlagStore,
	evaluator: FeatureEvaluator,
	sync: SyncEngine,
	manifest: FeatureManifest,
	sync_override: EnvironmentOverride,
}

impl App {
	#[instrument(skip(config), fields(database = %config.database.url))]
	pub async fn connect(config: &SwitchyardConfig) -> Result<Self> {
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.connect(&config.database.url)
			.await
			.with_context(|| format!("failed to open database {}", config.database.url))?;

		let store = SqliteFlagStore::new(pool);
		store
			.migrate()
			.await
			.context("failed to migrate features table")?;

		let backend = CacheStores::default().resolve(config.cache.store.as_deref())?;
		let cache = FlagCache::new(backend, config.cache.prefix.clone());

		let evaluator = FeatureEvaluator::new(
			Arc::new(store.clone()),
			cache.clone(),
			Arc::new(HandlerRegistry::new()),
			Arc::new(FlagsBroadcaster::with_defaults()),
		);
		let sync = SyncEngine::new(Arc::new(store.clone()), cache);

		Ok(Self {
			store,
			evaluator,
			sync,
			manifest: config.features.clone(),
			sync_override: config.sync_override(),
		})
	}

	pub async fn sync(&self, out: &mut impl Write, json: bool) -> Result<()> {
		let report = self.sync.sync(&self.manifest, self.sync_override).await?;

		if json {
			writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
			return Ok(());
		}

		if report.is_noop() {
			writeln!(out, "Features already in sync")?;
		}
		for name in &report.created {
			writeln!(out, "created {name}")?;
		}
		for name in &report.deleted {
			writeln!(out, "deleted {name}")?;
		}
		Ok(())
	}

	pub async fn list(&self, out: &mut impl Write, json: bool) -> Result<()> {
		let flags = self.store.all().await?;

		if json {
			writeln!(out, "{}", serde_json::to_string_pretty(&flags)?)?;
			return Ok(());
		}

		let width = flags.iter().map(|f| f.name.len()).max().unwrap_or(0);
		for flag in &flags {
			writeln!(out, "{:<width$}  {}", flag.name, flag.state)?;
		}
		Ok(())
	}

	/// Prints `on` or `off`.
	pub async fn check(
		&self,
		out: &mut impl Write,
		name: &str,
		context: &EvaluationContext,
		ignore_missing: bool,
	) -> Result<()> {
		if ignore_missing {
			self
				.evaluator
				.registry()
				.handle_missing_with(|feature| warn!(feature = %feature, "Feature is not defined"))
				.await;
		}

		let enabled = self.evaluator.evaluate(name, context).await?;
		writeln!(out, "{}", if enabled { "on" } else { "off" })?;
		Ok(())
	}

	/// Prints the persisted state.
	pub async fn state(&self, out: &mut impl Write, name: &str) -> Result<()> {
		match self.evaluator.get_state(name).await? {
			Some(state) => writeln!(out, "{state}")?,
			None => writeln!(out, "missing")?,
		}
		Ok(())
	}

	pub async fn set_state(&self, out: &mut impl Write, name: &str, state: FlagState) -> Result<()> {
		if let Some(flag) = self.evaluator.set_state(name, state).await? {
			info!(feature = %flag.name, state = %flag.state, "Updated feature");
			writeln!(out, "{} is now {}", flag.name, flag.state)?;
		}
		Ok(())
	}
}
