// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration produced by each source.

use serde::Deserialize;
use switchyard_flags_core::FeatureManifest;

use crate::sections::{
	CacheConfigLayer, DatabaseConfigLayer, EnvironmentConfigLayer, LoggingConfigLayer,
};

/// One source's view of the configuration. Every field is optional; later
/// layers override earlier ones field by field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwitchyardConfigLayer {
	#[serde(default)]
	pub cache: Option<CacheConfigLayer>,
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub environment: Option<EnvironmentConfigLayer>,
	/// Declared features. Entries from later layers are added to, and replace
	/// same-named entries from, earlier layers.
	#[serde(default)]
	pub features: Option<FeatureManifest>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl SwitchyardConfigLayer {
	pub fn merge(&mut self, other: SwitchyardConfigLayer) {
		merge_section(&mut self.cache, other.cache, CacheConfigLayer::merge);
		merge_section(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_section(
			&mut self.environment,
			other.environment,
			EnvironmentConfigLayer::merge,
		);
		merge_section(&mut self.features, other.features, |base, other| {
			for (name, state) in other.iter() {
				base.insert(name, state);
			}
		});
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	let Some(other) = other else {
		return;
	};
	match base {
		Some(existing) => merge(existing, other),
		None => *base = Some(other),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use switchyard_flags_core::FlagState;

	#[test]
	fn test_merge_fills_missing_sections() {
		let mut base = SwitchyardConfigLayer::default();
		base.merge(SwitchyardConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: Some("sqlite::memory:".to_string()),
			}),
			..Default::default()
		});

		assert_eq!(
			base.database.and_then(|d| d.url).as_deref(),
			Some("sqlite::memory:")
		);
		assert!(base.cache.is_none());
	}

	#[test]
	fn test_merge_sections_field_by_field() {
		let mut base = SwitchyardConfigLayer {
			cache: Some(CacheConfigLayer {
				store: Some("memory".to_string()),
				prefix: Some("app".to_string()),
			}),
			..Default::default()
		};
		base.merge(SwitchyardConfigLayer {
			cache: Some(CacheConfigLayer {
				store: None,
				prefix: Some("flags".to_string()),
			}),
			..Default::default()
		});

		let cache = base.cache.unwrap();
		assert_eq!(cache.store.as_deref(), Some("memory"));
		assert_eq!(cache.prefix.as_deref(), Some("flags"));
	}

	#[test]
	fn test_merge_features_extends_manifest() {
		let mut base = SwitchyardConfigLayer {
			features: Some(
				FeatureManifest::new()
					.with_feature("a", FlagState::On)
					.with_feature("b", FlagState::Off),
			),
			..Default::default()
		};
		base.merge(SwitchyardConfigLayer {
			features: Some(
				FeatureManifest::new()
					.with_feature("b", FlagState::Dynamic)
					.with_feature("c", FlagState::On),
			),
			..Default::default()
		});

		let features = base.features.unwrap();
		assert_eq!(features.len(), 3);
		assert_eq!(features.get("a"), Some(FlagState::On));
		assert_eq!(features.get("b"), Some(FlagState::Dynamic));
		assert_eq!(features.get("c"), Some(FlagState::On));
	}

	#[test]
	fn test_parse_full_toml() {
		let layer: SwitchyardConfigLayer = toml::from_str(
			r#"
			[cache]
			store = "memory"
			prefix = "testing"

			[database]
			url = "sqlite::memory:"

			[environment]
			name = "local"
			always_on = ["local", "testing"]

			[features]
			new-checkout = "on"
			legacy-search = "off"
			beta-dashboard = "dynamic"

			[logging]
			level = "debug"
			"#,
		)
		.unwrap();

		let features = layer.features.unwrap();
		assert_eq!(features.get("beta-dashboard"), Some(FlagState::Dynamic));
		assert_eq!(features.len(), 3);
		assert_eq!(
			layer.environment.unwrap().always_on,
			Some(vec!["local".to_string(), "testing".to_string()])
		);
	}

	#[test]
	fn test_invalid_feature_state_rejected() {
		let result: Result<SwitchyardConfigLayer, _> = toml::from_str(
			r#"
			[features]
			broken = "restricted"
			"#,
		);
		assert!(result.is_err());
	}
}
