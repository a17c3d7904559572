// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feature flag evaluation engine for Switchyard.
//!
//! This crate evaluates named on/off/dynamic flags against a persistent store
//! fronted by a cache, applies state changes and syncs a declared manifest.
//!
//! # Architecture
//!
//! - `store` - Durable flag records (SQLite)
//! - `cache` - Cache backends and the raw state cache
//! - `registry` - Dynamic decision handlers and the missing-feature handler
//! - `evaluator` - Evaluation and state mutation
//! - `sync` - Manifest reconciliation
//! - `broadcast` - Change notifications
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use switchyard_flags::{
//!     EvaluationContext, FeatureEvaluator, FlagCache, FlagsBroadcaster, HandlerRegistry,
//!     InMemoryCache, SqliteFlagStore,
//! };
//!
//! let store = SqliteFlagStore::new(pool);
//! store.migrate().await?;
//!
//! let evaluator = FeatureEvaluator::new(
//!     Arc::new(store),
//!     FlagCache::new(Arc::new(InMemoryCache::new()), "features"),
//!     Arc::new(HandlerRegistry::new()),
//!     Arc::new(FlagsBroadcaster::with_defaults()),
//! );
//!
//! evaluator
//!     .registry()
//!     .register("beta", |_, ctx| ctx.user_id.is_some())
//!     .await;
//!
//! let enabled = evaluator.is_on("beta", &EvaluationContext::new()).await?;
//! ```

pub mod broadcast;
pub mod cache;
pub mod error;
pub mod evaluator;
pub mod registry;
pub mod store;
pub mod sync;

pub use broadcast::{BroadcasterConfig, FlagsBroadcaster};
pub use cache::{CacheBackend, CacheStores, FlagCache, InMemoryCache};
pub use error::{FlagsServerError, Result};
pub use evaluator::FeatureEvaluator;
pub use registry::{DynamicHandler, HandlerRegistry, MissingFeatureHandler};
pub use store::{FlagStore, SqliteFlagStore};
pub use sync::{SyncEngine, SyncReport};

// Re-export core types for convenience
pub use switchyard_flags_core::{
	cache_key, EnvironmentOverride, EvaluationContext, FeatureManifest, Flag, FlagEvent, FlagState,
	FlagsError,
};
