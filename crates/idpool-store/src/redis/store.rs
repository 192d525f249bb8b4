//! Redis coordination store: scripts run server-side as Lua.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, info};

use idpool_core::config::store::RedisStoreConfig;
use idpool_core::error::{AppError, ErrorKind};
use idpool_core::result::AppResult;
use idpool_core::traits::store::CoordinationStore;
use idpool_core::types::{AtomicScript, ScriptHandle};

/// Redis-backed coordination store.
#[derive(Debug, Clone)]
pub struct RedisStore {
    /// Multiplexed, reconnecting connection shared by every call.
    conn: ConnectionManager,
    /// Prepended to every key this store touches.
    key_prefix: String,
}

impl RedisStore {
    /// Open a connection from configuration.
    pub async fn connect(config: &RedisStoreConfig) -> AppResult<Self> {
        info!(url = %mask_redis_url(&config.url), "Connecting to Redis");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Failed to create Redis client", e)
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::TransientStore, "Failed to connect to Redis", e)
        })?;

        info!(prefix = %config.key_prefix, "Connected to Redis");
        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
        })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }

    fn full_keys(&self, keys: &[String]) -> Vec<String> {
        keys.iter().map(|k| self.full_key(k)).collect()
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        let kind = classify(e.code(), e.detail());
        AppError::with_source(kind, format!("Redis error: {e}"), e)
    }
}

/// Error kind for a server reply's code and detail.
///
/// `NOSCRIPT` means the server lost its script cache. Type and integer
/// errors mean something other than an allocator wrote to our keys. An
/// `INCR` past `i64::MAX` leaves no id to hand out.
fn classify(code: Option<&str>, detail: Option<&str>) -> ErrorKind {
    let detail = detail.unwrap_or_default();
    match code {
        Some("NOSCRIPT") => ErrorKind::ScriptMissing,
        Some("WRONGTYPE") => ErrorKind::CorruptState,
        _ if detail.contains("would overflow") => ErrorKind::PoolExhausted,
        _ if detail.contains("not an integer") => ErrorKind::CorruptState,
        _ => ErrorKind::TransientStore,
    }
}

/// Mask password in Redis URL for safe logging.
fn mask_redis_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}

#[async_trait]
impl CoordinationStore for RedisStore {
    async fn load_script(&self, script: &AtomicScript) -> AppResult<ScriptHandle> {
        let mut conn = self.conn.clone();
        let sha: String = redis::cmd("SCRIPT")
            .arg("LOAD")
            .arg(script.body)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        info!(script = %script.kind, sha = %sha, "Loaded Lua script");
        Ok(ScriptHandle::new(sha))
    }

    async fn invoke_handle(
        &self,
        handle: &ScriptHandle,
        script: &AtomicScript,
        keys: &[String],
        args: &[String],
    ) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        let keys = self.full_keys(keys);
        let reply: Option<String> = redis::cmd("EVALSHA")
            .arg(handle.as_str())
            .arg(keys.len())
            .arg(&keys)
            .arg(args)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        debug!(script = %script.kind, "EVALSHA completed");
        Ok(reply)
    }

    async fn invoke_inline(
        &self,
        script: &AtomicScript,
        keys: &[String],
        args: &[String],
    ) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        let keys = self.full_keys(keys);
        let reply: Option<String> = redis::cmd("EVAL")
            .arg(script.body)
            .arg(keys.len())
            .arg(&keys)
            .arg(args)
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        debug!(script = %script.kind, "EVAL completed");
        Ok(reply)
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        let result: Option<String> = conn.get(self.full_key(key)).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn set_len(&self, key: &str) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let count: u64 = conn.scard(self.full_key(key)).await.map_err(Self::map_err)?;
        Ok(count)
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn
            .smembers(self.full_key(key))
            .await
            .map_err(Self::map_err)?;
        Ok(members)
    }

    async fn list_len(&self, key: &str) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let count: u64 = conn.llen(self.full_key(key)).await.map_err(Self::map_err)?;
        Ok(count)
    }

    async fn list_items(&self, key: &str) -> AppResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let items: Vec<String> = conn
            .lrange(self.full_key(key), 0, -1)
            .await
            .map_err(Self::map_err)?;
        Ok(items)
    }

    async fn delete(&self, keys: &[String]) -> AppResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let keys = self.full_keys(keys);
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(&keys).await.map_err(Self::map_err)?;
        debug!(count = removed, "Deleted keys");
        Ok(removed)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
