//! Shared test helpers for integration tests.

use idpool::{AppConfig, IdPoolContext};
use idpool_store::StoreManager;
use idpool_store::memory::MemoryStore;
use uuid::Uuid;

/// Test application context over a private in-memory store.
pub struct TestApp {
    /// Context handed to the code under test.
    pub context: IdPoolContext,
    /// The same store, for fault injection.
    pub store: MemoryStore,
}

impl TestApp {
    /// Context with default configuration.
    pub fn new() -> Self {
        Self::with_config("")
    }

    /// Context configured from a TOML document.
    pub fn with_config(toml: &str) -> Self {
        let config = AppConfig::from_toml(toml).expect("Failed to parse test config");
        let store = MemoryStore::new();
        let manager = StoreManager::from_store(std::sync::Arc::new(store.clone()));
        Self {
            context: IdPoolContext::with_store(config, manager),
            store,
        }
    }
}

/// Pool or counter name that no other test uses.
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}:{}", Uuid::new_v4().simple())
}
