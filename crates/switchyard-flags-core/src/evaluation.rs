// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Context handed to dynamic handlers on every evaluation.
///
/// The engine never inspects it; it exists so handlers can make per-request
/// decisions (current user, environment, arbitrary attributes).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
	pub user_id: Option<String>,
	pub environment: Option<String>,
	#[serde(default)]
	pub attributes: HashMap<String, serde_json::Value>,
}

impl EvaluationContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());
		self
	}

	pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
		self.environment = Some(environment.into());
		self
	}

	pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
		self.attributes.insert(key.into(), value);
		self
	}

	pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
		self.attributes.get(key)
	}
}
