//! Sequential id pool.
//!
//! Reuses released ids first, then advances a counter inside the range.
//! The counter never wraps around: once it passes the maximum the pool
//! reports exhaustion until ids are released again.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use idpool_core::config::allocator::{
    DEFAULT_MAX_ID, DEFAULT_MAX_RELEASED_IDS, DEFAULT_MIN_ID, SequentialIdConfig,
};
use idpool_core::error::AppError;
use idpool_core::result::AppResult;
use idpool_core::traits::generator::IdGenerator;
use idpool_core::traits::store::CoordinationStore;
use idpool_core::types::{EXHAUSTED_REPLY, IdRange, PoolStats};
use idpool_store::keys;

use super::reuse::ReuseQueue;
use crate::script::ScriptSet;
use crate::script::lua::{RELEASE_AND_ENQUEUE, SEQUENTIAL_GET};

/// Allocates and releases sequential ids for one pool.
#[derive(Debug)]
pub struct SequentialIdManager {
    /// Used set and released queue of this pool.
    queue: ReuseQueue,
    /// Store key of the counter.
    counter_key: String,
}

/// Builder for [`SequentialIdManager`].
#[derive(Debug)]
pub struct SequentialIdManagerBuilder {
    store: Arc<dyn CoordinationStore>,
    base_key: String,
    max_released_ids: i64,
    min_value: i64,
    max_value: i64,
}

impl SequentialIdManagerBuilder {
    /// Set the cap of the released queue. Non-positive values are ignored.
    pub fn with_max_released_ids(mut self, max: i64) -> Self {
        if max > 0 {
            self.max_released_ids = max;
        }
        self
    }

    /// Set the inclusive id range. Validated by [`Self::build`].
    pub fn with_range(mut self, min_value: i64, max_value: i64) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    /// Apply every setting of a configuration section.
    pub fn with_config(self, config: &SequentialIdConfig) -> Self {
        self.with_max_released_ids(config.max_released_ids)
            .with_range(config.min_value, config.max_value)
    }

    /// Validate the settings, register the scripts and create the manager.
    pub async fn build(self) -> AppResult<SequentialIdManager> {
        if self.base_key.is_empty() {
            return Err(AppError::configuration("base key cannot be empty"));
        }
        let range = IdRange::new(self.min_value, self.max_value)?;

        let scripts = ScriptSet::new(self.store, &[SEQUENTIAL_GET, RELEASE_AND_ENQUEUE]);
        scripts.load_all().await.map_err(|e| {
            AppError::with_source(
                e.kind,
                format!("failed to load initial scripts (base_key: {})", self.base_key),
                e,
            )
        })?;

        let queue = ReuseQueue::new(
            scripts,
            self.base_key.clone(),
            keys::sequential_used(&self.base_key),
            keys::sequential_released(&self.base_key),
            range,
            self.max_released_ids,
        );

        info!(
            base_key = %self.base_key,
            range = %range,
            max_released_ids = self.max_released_ids,
            "Sequential id manager created"
        );

        Ok(SequentialIdManager {
            queue,
            counter_key: keys::sequential_counter(&self.base_key),
        })
    }
}

impl SequentialIdManager {
    /// Start building a manager for the pool named `base_key`.
    pub fn builder(
        store: Arc<dyn CoordinationStore>,
        base_key: impl Into<String>,
    ) -> SequentialIdManagerBuilder {
        SequentialIdManagerBuilder {
            store,
            base_key: base_key.into(),
            max_released_ids: DEFAULT_MAX_RELEASED_IDS,
            min_value: DEFAULT_MIN_ID,
            max_value: DEFAULT_MAX_ID,
        }
    }

    /// Create a manager with default settings.
    pub async fn new(
        store: Arc<dyn CoordinationStore>,
        base_key: impl Into<String>,
    ) -> AppResult<Self> {
        Self::builder(store, base_key).build().await
    }

    /// Pool name.
    pub fn base_key(&self) -> &str {
        self.queue.base_key()
    }

    /// Ids this pool may hand out.
    pub fn range(&self) -> IdRange {
        self.queue.range()
    }

    /// Allocate the oldest released id, or the next counter value.
    ///
    /// Fails with [`idpool_core::ErrorKind::PoolExhausted`] once the counter
    /// has passed the range maximum and nothing is waiting for reuse.
    pub async fn allocate(&self) -> AppResult<i64> {
        let range = self.queue.range();
        let reply = self
            .queue
            .scripts()
            .run(
                &SEQUENTIAL_GET,
                &[
                    self.queue.released_key().to_string(),
                    self.queue.used_key().to_string(),
                    self.counter_key.clone(),
                ],
                &[
                    (range.min() - 1).to_string(),
                    range.max().to_string(),
                    range.width().to_string(),
                ],
            )
            .await
            .map_err(|e| {
                AppError::with_source(
                    e.kind,
                    format!(
                        "error executing sequential script (base_key: {})",
                        self.base_key()
                    ),
                    e,
                )
            })?;

        match reply.as_deref() {
            Some(EXHAUSTED_REPLY) => {
                warn!(base_key = %self.base_key(), range = %range, "Sequential id pool exhausted");
                Err(AppError::pool_exhausted(format!(
                    "id pool is exhausted (base_key: {}, range: {range})",
                    self.base_key()
                )))
            }
            Some(raw) => {
                let id = self.queue.parse_id(raw)?;
                debug!(base_key = %self.base_key(), id, "Allocated sequential id");
                Ok(id)
            }
            None => Err(AppError::internal(format!(
                "sequential script returned nil (base_key: {})",
                self.base_key()
            ))),
        }
    }

    /// Return an id to the pool. See [`ReuseQueue::release`].
    pub async fn release_id(&self, id: i64) -> AppResult<()> {
        self.queue.release(id).await?;
        Ok(())
    }

    /// Last counter value handed out, or `None` before the first allocation.
    pub async fn current_counter(&self) -> AppResult<Option<i64>> {
        match self.queue.scripts().store().get(&self.counter_key).await? {
            None => Ok(None),
            Some(raw) => self.queue.parse_id(&raw).map(Some),
        }
    }

    /// Number of ids currently in use.
    pub async fn count_used_ids(&self) -> AppResult<u64> {
        self.queue.count_used().await
    }

    /// Number of ids waiting for reuse.
    pub async fn count_released_ids(&self) -> AppResult<u64> {
        self.queue.count_released().await
    }

    /// Released ids, next to be reused first.
    pub async fn released_ids(&self) -> AppResult<Vec<i64>> {
        self.queue.released_ids().await
    }

    /// Ids currently in use, ascending.
    pub async fn used_ids(&self) -> AppResult<Vec<i64>> {
        self.queue.used_ids().await
    }

    /// Used and released counts plus the counter of this pool.
    pub async fn stats(&self) -> AppResult<PoolStats> {
        let counter = self.current_counter().await?;
        self.queue.stats(counter).await
    }

    /// Delete every key of this pool, counter included.
    pub async fn purge(&self) -> AppResult<()> {
        self.queue.purge(&[self.counter_key.clone()]).await?;
        Ok(())
    }
}

#[async_trait]
impl IdGenerator for SequentialIdManager {
    async fn next_id(&self) -> AppResult<i64> {
        self.allocate().await
    }

    /// Next counter value. Released ids are not considered.
    async fn current_next_id(&self) -> AppResult<i64> {
        Ok(match self.current_counter().await? {
            None => self.queue.range().min(),
            Some(counter) => counter.saturating_add(1),
        })
    }
}
