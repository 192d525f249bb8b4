//! Application context: one store connection shared by every allocator.

use tracing::info;

use idpool_allocator::{AtomicCounterGenerator, RoomIdManager, SequentialIdManager};
use idpool_core::config::AppConfig;
use idpool_core::result::AppResult;
use idpool_core::traits::store::CoordinationStore;
use idpool_store::StoreManager;

/// Loaded configuration plus the store the allocators run on.
#[derive(Debug, Clone)]
pub struct IdPoolContext {
    config: AppConfig,
    store: StoreManager,
}

impl IdPoolContext {
    /// Load configuration for `env`, install logging and connect the store.
    pub async fn init(env: &str) -> AppResult<Self> {
        let config = AppConfig::load(env)?;
        crate::telemetry::init_logging(&config.logging);
        info!(env, version = env!("CARGO_PKG_VERSION"), "Starting idpool");
        Self::from_config(config).await
    }

    /// Validate `config` and connect to the configured store.
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        info!(provider = %config.store.provider, "Initializing coordination store");
        let store = StoreManager::new(&config.store).await?;
        Ok(Self { config, store })
    }

    /// Build a context around an existing store.
    pub fn with_store(config: AppConfig, store: StoreManager) -> Self {
        Self { config, store }
    }

    /// Loaded configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared store.
    pub fn store(&self) -> &StoreManager {
        &self.store
    }

    /// Whether the store answers.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.store.health_check().await
    }

    /// Random room id pool named `base_key`, using the `[room_ids]` defaults.
    pub fn room_ids(&self, base_key: &str) -> AppResult<RoomIdManager> {
        RoomIdManager::builder(self.store.store(), base_key)
            .with_config(&self.config.room_ids)
            .build()
    }

    /// Sequential id pool named `base_key`, using the `[sequential_ids]` defaults.
    pub async fn sequential_ids(&self, base_key: &str) -> AppResult<SequentialIdManager> {
        SequentialIdManager::builder(self.store.store(), base_key)
            .with_config(&self.config.sequential_ids)
            .build()
            .await
    }

    /// Atomic counter stored under `key`, starting at `[counter].initial_value`.
    pub async fn counter(&self, key: &str) -> AppResult<AtomicCounterGenerator> {
        AtomicCounterGenerator::new(self.store.store(), key, self.config.counter.initial_value)
            .await
    }
}
