// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::SwitchyardConfigLayer;
use crate::sections::{
	parse_list, CacheConfigLayer, DatabaseConfigLayer, EnvironmentConfigLayer, LogFormat,
	LoggingConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<SwitchyardConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<SwitchyardConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(SwitchyardConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/switchyard/switchyard.toml")
	}

	/// `switchyard.toml` in the working directory.
	pub fn local() -> Self {
		Self::new("switchyard.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<SwitchyardConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(SwitchyardConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: SwitchyardConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: SWITCHYARD_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<SwitchyardConfigLayer, ConfigError> {
		debug!("loading environment variables");
		load_layer(&env_var)
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Builds a layer from a variable lookup.
fn load_layer(lookup: &dyn Fn(&str) -> Option<String>) -> Result<SwitchyardConfigLayer, ConfigError> {
	Ok(SwitchyardConfigLayer {
		cache: Some(CacheConfigLayer {
			store: lookup("SWITCHYARD_CACHE_STORE"),
			prefix: lookup("SWITCHYARD_CACHE_PREFIX"),
		}),
		database: Some(DatabaseConfigLayer {
			url: lookup("SWITCHYARD_DATABASE_URL"),
		}),
		environment: Some(EnvironmentConfigLayer {
			name: lookup("SWITCHYARD_ENV"),
			always_on: lookup("SWITCHYARD_ALWAYS_ON").map(|v| parse_list(&v)),
		}),
		features: None,
		logging: Some(LoggingConfigLayer {
			level: lookup("SWITCHYARD_LOG_LEVEL"),
			format: lookup("SWITCHYARD_LOG_FORMAT")
				.map(|v| {
					v.parse::<LogFormat>()
						.map_err(|message| ConfigError::invalid_value("SWITCHYARD_LOG_FORMAT", message))
				})
				.transpose()?,
		}),
	})
}
