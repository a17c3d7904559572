// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Separator between the cache prefix and the flag name.
pub const KEY_SEPARATOR: &str = ".";

/// Derives the cache key for a flag.
///
/// Empty parts are dropped, so an empty prefix yields the bare name.
pub fn cache_key(prefix: &str, name: &str) -> String {
	[prefix, name]
		.iter()
		.filter(|part| !part.is_empty())
		.copied()
		.collect::<Vec<_>>()
		.join(KEY_SEPARATOR)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_empty_prefix_is_omitted() {
		assert_eq!(cache_key("", "f"), "f");
	}

	#[test]
	fn test_prefix_is_joined() {
		assert_eq!(cache_key("app", "f"), "app.f");
		assert_eq!(cache_key("some-prefix", "some-feature"), "some-prefix.some-feature");
	}

	proptest! {
		#[test]
		fn key_ends_with_name(prefix in "[a-z]{0,10}", name in "[a-z][a-z0-9_-]{0,20}") {
			let key = cache_key(&prefix, &name);
			prop_assert!(key.ends_with(&name));
			if prefix.is_empty() {
				prop_assert_eq!(key, name);
			} else {
				prop_assert_eq!(key, format!("{prefix}.{name}"));
			}
		}

		#[test]
		fn key_is_deterministic(prefix in "[a-z]{0,10}", name in "[a-z]{1,20}") {
			prop_assert_eq!(cache_key(&prefix, &name), cache_key(&prefix, &name));
		}
	}
}
