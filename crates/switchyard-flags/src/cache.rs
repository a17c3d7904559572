// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cache backends and the flag state cache built on top of them.
//!
//! Only the raw persisted state string (`"on"`, `"off"`, `"dynamic"`) is ever
//! cached. Entries are written without expiry and removed explicitly whenever
//! the store changes.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use switchyard_flags_core::cache_key;

use crate::error::{FlagsServerError, Result};

/// Generic key-value cache.
#[async_trait]
pub trait CacheBackend: Send + Sync {
	async fn get(&self, key: &str) -> Result<Option<String>>;
	/// Stores a value with no expiry.
	async fn set(&self, key: &str, value: &str) -> Result<()>;
	async fn forget(&self, key: &str) -> Result<()>;
}

/// Process-local cache backend.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
	inner: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn len(&self) -> usize {
		self.inner.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.inner.read().await.is_empty()
	}

	pub async fn clear(&self) {
		self.inner.write().await.clear();
	}
}

#[async_trait]
impl CacheBackend for InMemoryCache {
	async fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.inner.read().await.get(key).cloned())
	}

	async fn set(&self, key: &str, value: &str) -> Result<()> {
		self
			.inner
			.write()
			.await
			.insert(key.to_string(), value.to_string());
		Ok(())
	}

	async fn forget(&self, key: &str) -> Result<()> {
		self.inner.write().await.remove(key);
		Ok(())
	}
}

/// Named cache backends with a process-wide default.
///
/// Resolves the `cache.store` setting: `None` selects the default backend.
#[derive(Clone)]
pub struct CacheStores {
	default: Arc<dyn CacheBackend>,
	named: HashMap<String, Arc<dyn CacheBackend>>,
}

impl CacheStores {
	pub fn new(default: Arc<dyn CacheBackend>) -> Self {
		Self {
			default,
			named: HashMap::new(),
		}
	}

	pub fn with_store(mut self, name: impl Into<String>, backend: Arc<dyn CacheBackend>) -> Self {
		self.named.insert(name.into(), backend);
		self
	}

	pub fn resolve(&self, name: Option<&str>) -> Result<Arc<dyn CacheBackend>> {
		match name {
			None => Ok(Arc::clone(&self.default)),
			Some(name) => self
				.named
				.get(name)
				.cloned()
				.ok_or_else(|| FlagsServerError::UnknownCacheStore(name.to_string())),
		}
	}
}

impl Default for CacheStores {
	fn default() -> Self {
		let memory: Arc<dyn CacheBackend> = Arc::new(InMemoryCache::new());
		Self::new(Arc::clone(&memory)).with_store("memory", memory)
	}
}

/// Cache of raw persisted flag states, keyed by `<prefix>.<name>`.
#[derive(Clone)]
pub struct FlagCache {
	backend: Arc<dyn CacheBackend>,
	prefix: String,
}

impl FlagCache {
	pub fn new(backend: Arc<dyn CacheBackend>, prefix: impl Into<String>) -> Self {
		Self {
			backend,
			prefix: prefix.into(),
		}
	}

	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	pub fn key(&self, name: &str) -> String {
		cache_key(&self.prefix, name)
	}

	/// Returns the cached raw state, computing and storing it on a miss.
	///
	/// A `None` from `compute` is never retained, so a flag created later is
	/// seen on the next call. Errors from `compute` propagate and nothing is
	/// written.
	pub async fn get_or_compute<F, Fut>(&self, name: &str, compute: F) -> Result<Option<String>>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<Option<String>>>,
	{
		let key = self.key(name);

		if let Some(raw) = self.backend.get(&key).await? {
			trace!(key = %key, "flag state cache hit");
			return Ok(Some(raw));
		}

		debug!(key = %key, "flag state cache miss");
		match compute().await? {
			Some(raw) => {
				self.backend.set(&key, &raw).await?;
				Ok(Some(raw))
			}
			None => {
				self.backend.forget(&key).await?;
				Ok(None)
			}
		}
	}

	/// Removes the entry for `name`.
	pub async fn invalidate(&self, name: &str) -> Result<()> {
		let key = self.key(name);
		debug!(key = %key, "invalidating flag state cache entry");
		self.backend.forget(&key).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn flag_cache(prefix: &str) -> (InMemoryCache, FlagCache) {
		let backend = InMemoryCache::new();
		let cache = FlagCache::new(Arc::new(backend.clone()), prefix);
		(backend, cache)
	}

	#[tokio::test]
	async fn test_in_memory_get_set_forget() {
		let cache = InMemoryCache::new();
		assert!(cache.get("k").await.unwrap().is_none());

		cache.set("k", "on").await.unwrap();
		assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("on"));
		assert_eq!(cache.len().await, 1);

		cache.forget("k").await.unwrap();
		assert!(cache.get("k").await.unwrap().is_none());
		assert!(cache.is_empty().await);
	}

	#[tokio::test]
	async fn test_clone_shares_state() {
		let cache = InMemoryCache::new();
		let clone = cache.clone();
		cache.set("k", "off").await.unwrap();
		assert_eq!(clone.get("k").await.unwrap().as_deref(), Some("off"));

		clone.clear().await;
		assert!(cache.is_empty().await);
	}

	#[test]
	fn test_key_uses_prefix() {
		let (_, cache) = flag_cache("testing");
		assert_eq!(cache.key("some-feature"), "testing.some-feature");

		let (_, bare) = flag_cache("");
		assert_eq!(bare.key("some-feature"), "some-feature");
	}

	#[tokio::test]
	async fn test_get_or_compute_caches_forever() {
		let (backend, cache) = flag_cache("testing");
		let calls = AtomicUsize::new(0);

		for _ in 0..3 {
			let calls = &calls;
			let raw = cache
				.get_or_compute("some-feature", move || async move {
					calls.fetch_add(1, Ordering::SeqCst);
					Ok(Some("on".to_string()))
				})
				.await
				.unwrap();
			assert_eq!(raw.as_deref(), Some("on"));
		}

		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(
			backend.get("testing.some-feature").await.unwrap().as_deref(),
			Some("on")
		);
	}

	#[tokio::test]
	async fn test_get_or_compute_does_not_retain_absent() {
		let (backend, cache) = flag_cache("testing");
		let calls = AtomicUsize::new(0);

		for _ in 0..2 {
			let calls = &calls;
			let raw = cache
				.get_or_compute("some-feature", move || async move {
					calls.fetch_add(1, Ordering::SeqCst);
					Ok(None)
				})
				.await
				.unwrap();
			assert!(raw.is_none());
		}

		// Absent results are recomputed every time
		assert_eq!(calls.load(Ordering::SeqCst), 2);
		assert!(backend.is_empty().await);
	}

	#[tokio::test]
	async fn test_get_or_compute_error_writes_nothing() {
		let (backend, cache) = flag_cache("testing");

		let err = cache
			.get_or_compute("some-feature", || async {
				Err(FlagsServerError::Internal("store down".to_string()))
			})
			.await
			.unwrap_err();

		assert!(matches!(err, FlagsServerError::Internal(_)));
		assert!(backend.is_empty().await);
	}

	struct UnreachableCache;

	#[async_trait]
	impl CacheBackend for UnreachableCache {
		async fn get(&self, _key: &str) -> Result<Option<String>> {
			Err(FlagsServerError::Cache("connection refused".to_string()))
		}

		async fn set(&self, _key: &str, _value: &str) -> Result<()> {
			Err(FlagsServerError::Cache("connection refused".to_string()))
		}

		async fn forget(&self, _key: &str) -> Result<()> {
			Err(FlagsServerError::Cache("connection refused".to_string()))
		}
	}

	#[tokio::test]
	async fn test_backend_failure_propagates() {
		let cache = FlagCache::new(Arc::new(UnreachableCache), "testing");
		let calls = AtomicUsize::new(0);
		let counter = &calls;

		let err = cache
			.get_or_compute("some-feature", move || async move {
				counter.fetch_add(1, Ordering::SeqCst);
				Ok(Some("on".to_string()))
			})
			.await
			.unwrap_err();
		assert!(matches!(err, FlagsServerError::Cache(_)));
		assert_eq!(calls.load(Ordering::SeqCst), 0);

		let err = cache.invalidate("some-feature").await.unwrap_err();
		assert!(matches!(err, FlagsServerError::Cache(_)));
	}

	#[tokio::test]
	async fn test_invalidate_removes_entry() {
		let (backend, cache) = flag_cache("testing");
		backend.set("testing.some-feature", "off").await.unwrap();

		cache.invalidate("some-feature").await.unwrap();

		assert!(backend.get("testing.some-feature").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_cache_stores_resolution() {
		let redis_like: Arc<dyn CacheBackend> = Arc::new(InMemoryCache::new());
		let stores = CacheStores::default().with_store("array", Arc::clone(&redis_like));

		assert!(stores.resolve(None).is_ok());
		assert!(stores.resolve(Some("memory")).is_ok());

		let array = stores.resolve(Some("array")).unwrap();
		array.set("k", "on").await.unwrap();
		assert_eq!(redis_like.get("k").await.unwrap().as_deref(), Some("on"));

		let err = stores.resolve(Some("file")).err().unwrap();
		assert!(matches!(err, FlagsServerError::UnknownCacheStore(ref n) if n == "file"));
	}
}
