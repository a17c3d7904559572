// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for Switchyard.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - The declared feature manifest (`[features]` table)
//! - Consistent environment variable naming (`SWITCHYARD_*`)
//!
//! # Usage
//!
//! ```ignore
//! use switchyard_config::load_config;
//!
//! let config = load_config()?;
//! println!("{} features declared", config.features.len());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::SwitchyardConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use switchyard_flags_core::{EnvironmentOverride, FeatureManifest, Flag, KEY_SEPARATOR};
use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default)]
pub struct SwitchyardConfig {
	pub cache: CacheConfig,
	pub database: DatabaseConfig,
	pub environment: EnvironmentConfig,
	pub features: FeatureManifest,
	pub logging: LoggingConfig,
}

impl SwitchyardConfig {
	/// The override applied to features created by sync.
	pub fn sync_override(&self) -> EnvironmentOverride {
		self.environment.sync_override()
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`SWITCHYARD_*`)
/// 2. `./switchyard.toml`
/// 3. `/etc/switchyard/switchyard.toml`
/// 4. Built-in defaults
pub fn load_config() -> Result<SwitchyardConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(TomlSource::local()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<SwitchyardConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<SwitchyardConfig, ConfigError> {
	// Stable sort keeps file sources in the order given
	sources.sort_by_key(|s| s.precedence());

	let mut merged = SwitchyardConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: SwitchyardConfigLayer) -> Result<SwitchyardConfig, ConfigError> {
	let cache = layer.cache.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let environment = layer.environment.unwrap_or_default().finalize();
	let features = layer.features.unwrap_or_default();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&cache, &features)?;

	info!(
		cache_store = cache.store.as_deref().unwrap_or("default"),
		cache_prefix = %cache.prefix,
		database = %database.url,
		environment = %environment.name,
		always_on = environment.always_on.len(),
		features = features.len(),
		"Configuration loaded"
	);

	Ok(SwitchyardConfig {
		cache,
		database,
		environment,
		features,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(cache: &CacheConfig, features: &FeatureManifest) -> Result<(), ConfigError> {
	if cache.prefix.ends_with(KEY_SEPARATOR) {
		return Err(ConfigError::validation(format!(
			"cache prefix '{}' must not end with '{KEY_SEPARATOR}'",
			cache.prefix
		)));
	}

	if let Some(name) = features.names().find(|name| !Flag::validate_name(name)) {
		return Err(ConfigError::validation(format!(
			"invalid feature name {name:?}: names must be non-empty, unpadded and free of control characters"
		)));
	}

	Ok(())
}
