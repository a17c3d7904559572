// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Registry of dynamic decision handlers and the missing-feature handler.
//!
//! The registry is an ordinary object shared through `Arc` and injected into
//! the evaluator. Registration may happen at any time, including while
//! evaluations are in flight: all access goes through an async `RwLock` that
//! is held only long enough to clone the handler out. Handlers themselves run
//! with no lock held.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use switchyard_flags_core::EvaluationContext;

/// Decides a dynamic flag for one evaluation.
///
/// Only a return value of exactly `Value::Bool(true)` enables the feature;
/// `1`, `"yes"` or any other truthy-looking value counts as disabled.
pub type DynamicHandler = Arc<dyn Fn(&str, &EvaluationContext) -> Value + Send + Sync>;

/// Invoked with the feature name when no record exists for it.
pub type MissingFeatureHandler = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct RegistryInner {
	handlers: HashMap<String, DynamicHandler>,
	default_handler: Option<DynamicHandler>,
	missing_handler: Option<MissingFeatureHandler>,
}

/// Process-wide handler registrations.
#[derive(Default)]
pub struct HandlerRegistry {
	inner: RwLock<RegistryInner>,
}

impl HandlerRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds a handler for `feature`, replacing any earlier one.
	pub async fn register<F, R>(&self, feature: impl Into<String>, handler: F)
	where
		F: Fn(&str, &EvaluationContext) -> R + Send + Sync + 'static,
		R: Into<Value>,
	{
		let feature = feature.into();
		debug!(feature = %feature, "registering dynamic handler");
		self
			.inner
			.write()
			.await
			.handlers
			.insert(feature, wrap(handler));
	}

	/// Binds the handler used for dynamic flags without a specific handler.
	pub async fn register_default<F, R>(&self, handler: F)
	where
		F: Fn(&str, &EvaluationContext) -> R + Send + Sync + 'static,
		R: Into<Value>,
	{
		debug!("registering default dynamic handler");
		self.inner.write().await.default_handler = Some(wrap(handler));
	}

	/// Binds the missing-feature handler. Its return value is ignored.
	pub async fn handle_missing_with<F>(&self, handler: F)
	where
		F: Fn(&str) + Send + Sync + 'static,
	{
		self.inner.write().await.missing_handler = Some(Arc::new(handler));
	}

	/// Resolves a dynamic flag to a boolean.
	///
	/// Feature-specific handler first, then the default handler, otherwise
	/// `false`.
	pub async fn resolve(&self, feature: &str, context: &EvaluationContext) -> bool {
		let handler = {
			let inner = self.inner.read().await;
			inner
				.handlers
				.get(feature)
				.or(inner.default_handler.as_ref())
				.cloned()
		};

		match handler {
			Some(handler) => {
				let decision = handler(feature, context);
				trace!(feature = %feature, decision = %decision, "dynamic handler returned");
				decision == Value::Bool(true)
			}
			None => {
				trace!(feature = %feature, "no dynamic handler registered");
				false
			}
		}
	}

	/// Runs the missing-feature handler if one is registered.
	///
	/// Returns `false` when there is none, in which case the caller must fail
	/// with a missing-feature error.
	pub async fn handle_missing(&self, feature: &str) -> bool {
		let handler = self.inner.read().await.missing_handler.clone();
		match handler {
			Some(handler) => {
				handler(feature);
				true
			}
			None => false,
		}
	}

	pub async fn has_handler(&self, feature: &str) -> bool {
		self.inner.read().await.handlers.contains_key(feature)
	}

	pub async fn has_default_handler(&self) -> bool {
		self.inner.read().await.default_handler.is_some()
	}

	pub async fn has_missing_handler(&self) -> bool {
		self.inner.read().await.missing_handler.is_some()
	}

	/// Clears every registration, including the default and missing handlers.
	pub async fn reset(&self) {
		let mut inner = self.inner.write().await;
		inner.handlers.clear();
		inner.default_handler = None;
		inner.missing_handler = None;
		debug!("handler registry reset");
	}
}

impl fmt::Debug for HandlerRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HandlerRegistry").finish_non_exhaustive()
	}
}

fn wrap<F, R>(handler: F) -> DynamicHandler
where
	F: Fn(&str, &EvaluationContext) -> R + Send + Sync + 'static,
	R: Into<Value>,
{
	Arc::new(move |feature: &str, context: &EvaluationContext| -> Value {
		handler(feature, context).into()
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn ctx() -> EvaluationContext {
		EvaluationContext::new()
	}

	#[tokio::test]
	async fn test_no_handler_resolves_false() {
		let registry = HandlerRegistry::new();
		assert!(!registry.resolve("some-feature", &ctx()).await);
	}

	#[tokio::test]
	async fn test_specific_handler() {
		let registry = HandlerRegistry::new();
		registry.register("some-feature", |_, _| true).await;

		assert!(registry.resolve("some-feature", &ctx()).await);
		assert!(!registry.resolve("other-feature", &ctx()).await);
		assert!(registry.has_handler("some-feature").await);
	}

	#[tokio::test]
	async fn test_truthy_values_are_not_true() {
		let registry = HandlerRegistry::new();
		registry.register("int", |_, _| 1).await;
		registry.register("string", |_, _| "yes").await;
		registry.register("object", |_, _| json!({"enabled": true})).await;
		registry.register("false", |_, _| false).await;

		for feature in ["int", "string", "object", "false"] {
			assert!(
				!registry.resolve(feature, &ctx()).await,
				"{feature} should resolve to false"
			);
		}
	}

	#[tokio::test]
	async fn test_specific_handler_wins_over_default() {
		let registry = HandlerRegistry::new();
		registry.register_default(|_, _| true).await;
		registry.register("some-feature", |_, _| false).await;

		assert!(!registry.resolve("some-feature", &ctx()).await);
		assert!(registry.resolve("other-feature", &ctx()).await);
	}

	#[tokio::test]
	async fn test_register_overwrites() {
		let registry = HandlerRegistry::new();
		registry.register("some-feature", |_, _| false).await;
		registry.register("some-feature", |_, _| true).await;
		assert!(registry.resolve("some-feature", &ctx()).await);
	}

	#[tokio::test]
	async fn test_handler_receives_name_and_context() {
		let registry = HandlerRegistry::new();
		registry
			.register("beta", |feature, ctx| {
				feature == "beta" && ctx.attribute("beta_tester") == Some(&json!(true))
			})
			.await;

		let tester = EvaluationContext::new().with_attribute("beta_tester", json!(true));
		assert!(registry.resolve("beta", &tester).await);
		assert!(!registry.resolve("beta", &ctx()).await);
	}

	#[tokio::test]
	async fn test_missing_handler() {
		let registry = HandlerRegistry::new();
		assert!(!registry.handle_missing("some-feature").await);

		let calls = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&calls);
		registry
			.handle_missing_with(move |_| {
				counter.fetch_add(1, Ordering::SeqCst);
			})
			.await;

		assert!(registry.handle_missing("some-feature").await);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_reset_clears_everything() {
		let registry = HandlerRegistry::new();
		registry.register("some-feature", |_, _| true).await;
		registry.register_default(|_, _| true).await;
		registry.handle_missing_with(|_| {}).await;

		registry.reset().await;

		assert!(!registry.has_handler("some-feature").await);
		assert!(!registry.has_default_handler().await);
		assert!(!registry.has_missing_handler().await);
		assert!(!registry.resolve("some-feature", &ctx()).await);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_register_and_resolve() {
		let registry = Arc::new(HandlerRegistry::new());
		let mut tasks = Vec::new();

		for i in 0..16 {
			let registry = Arc::clone(&registry);
			tasks.push(tokio::spawn(async move {
				let name = format!("feature-{}", i % 4);
				if i % 2 == 0 {
					registry.register(name, |_, _| true).await;
				} else {
					let _ = registry.resolve(&name, &EvaluationContext::new()).await;
				}
			}));
		}

		for task in tasks {
			task.await.unwrap();
		}

		// Even-indexed tasks registered features 0 and 2
		assert!(registry.resolve("feature-0", &ctx()).await);
		assert!(registry.resolve("feature-2", &ctx()).await);
	}
}
