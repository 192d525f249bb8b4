//! Coordination store capability.
//!
//! Every allocator state change runs as one atomic script at the store.
//! The trait hides whether that is Lua on a Redis server or a
//! mutex-guarded emulation in process.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{AtomicScript, ScriptHandle};

/// Trait for stores that can execute named atomic operations.
///
/// Script replies are normalised to `Option<String>`: every script returns
/// either nil or a string.
#[async_trait]
pub trait CoordinationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Register a script and return its handle.
    ///
    /// Registering the same script twice (from any number of clients) must
    /// return an equivalent handle.
    async fn load_script(&self, script: &AtomicScript) -> AppResult<ScriptHandle>;

    /// Execute a registered script by handle.
    ///
    /// Fails with [`crate::ErrorKind::ScriptMissing`] when the store no
    /// longer knows the handle.
    async fn invoke_handle(
        &self,
        handle: &ScriptHandle,
        script: &AtomicScript,
        keys: &[String],
        args: &[String],
    ) -> AppResult<Option<String>>;

    /// Execute a script by sending its full body.
    async fn invoke_inline(
        &self,
        script: &AtomicScript,
        keys: &[String],
        args: &[String],
    ) -> AppResult<Option<String>>;

    /// Read a plain string value.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Cardinality of a set. Missing keys count as empty.
    async fn set_len(&self, key: &str) -> AppResult<u64>;

    /// Members of a set, in no particular order.
    async fn set_members(&self, key: &str) -> AppResult<Vec<String>>;

    /// Length of a list. Missing keys count as empty.
    async fn list_len(&self, key: &str) -> AppResult<u64>;

    /// Whole list, head first.
    async fn list_items(&self, key: &str) -> AppResult<Vec<String>>;

    /// Delete keys. Returns the number of keys that existed.
    async fn delete(&self, keys: &[String]) -> AppResult<u64>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
