//! Store manager that dispatches to the configured backend.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use idpool_core::config::store::StoreConfig;
use idpool_core::error::AppError;
use idpool_core::result::AppResult;
use idpool_core::traits::store::CoordinationStore;
use idpool_core::types::{AtomicScript, ScriptHandle};

/// Store manager that wraps the configured coordination store.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner store.
    inner: Arc<dyn CoordinationStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn CoordinationStore> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis coordination store");
                Arc::new(crate::redis::RedisStore::connect(&config.redis).await?)
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory coordination store");
                Arc::new(crate::memory::MemoryStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing store (for testing).
    pub fn from_store(store: Arc<dyn CoordinationStore>) -> Self {
        Self { inner: store }
    }

    /// Shared handle to the inner store, as the allocators take it.
    pub fn store(&self) -> Arc<dyn CoordinationStore> {
        Arc::clone(&self.inner)
    }
}

#[async_trait]
impl CoordinationStore for StoreManager {
    async fn load_script(&self, script: &AtomicScript) -> AppResult<ScriptHandle> {
        self.inner.load_script(script).await
    }

    async fn invoke_handle(
        &self,
        handle: &ScriptHandle,
        script: &AtomicScript,
        keys: &[String],
        args: &[String],
    ) -> AppResult<Option<String>> {
        self.inner.invoke_handle(handle, script, keys, args).await
    }

    async fn invoke_inline(
        &self,
        script: &AtomicScript,
        keys: &[String],
        args: &[String],
    ) -> AppResult<Option<String>> {
        self.inner.invoke_inline(script, keys, args).await
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set_len(&self, key: &str) -> AppResult<u64> {
        self.inner.set_len(key).await
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        self.inner.set_members(key).await
    }

    async fn list_len(&self, key: &str) -> AppResult<u64> {
        self.inner.list_len(key).await
    }

    async fn list_items(&self, key: &str) -> AppResult<Vec<String>> {
        self.inner.list_items(key).await
    }

    async fn delete(&self, keys: &[String]) -> AppResult<u64> {
        self.inner.delete(keys).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
