//! Random room id pool.
//!
//! Ids are drawn uniformly at random from the range and claimed with an
//! atomic set insert. Released ids are reused first under
//! [`GenerationStrategy::PreferReleased`].

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rand::rngs::OsRng;
use tracing::{debug, info, warn};

use idpool_core::config::allocator::{
    DEFAULT_MAX_ID, DEFAULT_MAX_RELEASED_IDS, DEFAULT_MIN_ID, DEFAULT_RANDOM_ATTEMPTS,
    DEFAULT_RETRY_BACKOFF_MS, RoomIdConfig,
};
use idpool_core::error::{AppError, ErrorKind};
use idpool_core::result::AppResult;
use idpool_core::traits::store::CoordinationStore;
use idpool_core::types::{GenerationStrategy, IdRange, PoolStats};
use idpool_store::keys;

use super::reuse::ReuseQueue;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::script::ScriptSet;
use crate::script::lua::{RELEASE_AND_ENQUEUE, REUSE_TAKE_OR_MARK};

/// Allocates and releases room ids for one pool.
#[derive(Debug)]
pub struct RoomIdManager {
    /// Used set and released queue of this pool.
    queue: ReuseQueue,
    /// Whether released ids are consumed before generating.
    strategy: GenerationStrategy,
    /// Random candidate budget and the wait between candidates.
    retry: RetryPolicy,
    /// Performs the wait.
    sleeper: Arc<dyn Sleeper>,
}

/// Builder for [`RoomIdManager`].
#[derive(Debug)]
pub struct RoomIdManagerBuilder {
    store: Arc<dyn CoordinationStore>,
    base_key: String,
    strategy: GenerationStrategy,
    max_released_ids: i64,
    random_attempts: u32,
    min_value: i64,
    max_value: i64,
    backoff: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl RoomIdManagerBuilder {
    /// Set the generation strategy.
    pub fn with_strategy(mut self, strategy: GenerationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the cap of the released queue. Non-positive values are ignored.
    pub fn with_max_released_ids(mut self, max: i64) -> Self {
        if max > 0 {
            self.max_released_ids = max;
        }
        self
    }

    /// Set the random candidate budget. Zero is ignored.
    pub fn with_random_attempts(mut self, attempts: u32) -> Self {
        if attempts > 0 {
            self.random_attempts = attempts;
        }
        self
    }

    /// Set the inclusive id range. Validated by [`Self::build`].
    pub fn with_range(mut self, min_value: i64, max_value: i64) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    /// Set the wait between random candidates.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Replace the component that performs the wait.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Apply every setting of a configuration section.
    pub fn with_config(self, config: &RoomIdConfig) -> Self {
        self.with_strategy(config.strategy)
            .with_max_released_ids(config.max_released_ids)
            .with_random_attempts(config.random_attempts)
            .with_range(config.min_value, config.max_value)
            .with_backoff(Duration::from_millis(config.retry_backoff_ms))
    }

    /// Validate the settings and create the manager.
    ///
    /// Scripts are registered lazily on first use, or eagerly with
    /// [`RoomIdManager::load_scripts`].
    pub fn build(self) -> AppResult<RoomIdManager> {
        if self.base_key.is_empty() {
            return Err(AppError::configuration("base key cannot be empty"));
        }
        let range = IdRange::new(self.min_value, self.max_value)?;

        let scripts = ScriptSet::new(self.store, &[REUSE_TAKE_OR_MARK, RELEASE_AND_ENQUEUE]);
        let queue = ReuseQueue::new(
            scripts,
            self.base_key.clone(),
            keys::room_used(&self.base_key),
            keys::room_released(&self.base_key),
            range,
            self.max_released_ids,
        );

        info!(
            base_key = %self.base_key,
            range = %range,
            strategy = %self.strategy,
            max_released_ids = self.max_released_ids,
            random_attempts = self.random_attempts,
            "Room id manager created"
        );

        Ok(RoomIdManager {
            queue,
            strategy: self.strategy,
            retry: RetryPolicy {
                attempts: self.random_attempts,
                backoff: self.backoff,
            },
            sleeper: self.sleeper,
        })
    }
}

impl RoomIdManager {
    /// Start building a manager for the pool named `base_key`.
    pub fn builder(
        store: Arc<dyn CoordinationStore>,
        base_key: impl Into<String>,
    ) -> RoomIdManagerBuilder {
        RoomIdManagerBuilder {
            store,
            base_key: base_key.into(),
            strategy: GenerationStrategy::default(),
            max_released_ids: DEFAULT_MAX_RELEASED_IDS,
            random_attempts: DEFAULT_RANDOM_ATTEMPTS,
            min_value: DEFAULT_MIN_ID,
            max_value: DEFAULT_MAX_ID,
            backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Create a manager with default settings.
    pub fn new(store: Arc<dyn CoordinationStore>, base_key: impl Into<String>) -> AppResult<Self> {
        Self::builder(store, base_key).build()
    }

    /// Register both scripts with the store now instead of on first use.
    pub async fn load_scripts(&self) -> AppResult<()> {
        self.queue.scripts().load_all().await
    }

    /// Pool name.
    pub fn base_key(&self) -> &str {
        self.queue.base_key()
    }

    /// Ids this pool may hand out.
    pub fn range(&self) -> IdRange {
        self.queue.range()
    }

    /// Configured generation strategy.
    pub fn strategy(&self) -> GenerationStrategy {
        self.strategy
    }

    /// Allocate a room id according to the configured strategy.
    pub async fn next_available_id(&self) -> AppResult<i64> {
        match self.strategy {
            GenerationStrategy::PreferNew => self.generate_random().await,
            GenerationStrategy::PreferReleased => {
                if let Some(id) = self.queue.take_released().await? {
                    return Ok(id);
                }
                self.generate_random().await
            }
        }
    }

    /// Draw random candidates until one is claimed or the budget runs out.
    async fn generate_random(&self) -> AppResult<i64> {
        let range = self.queue.range();
        let base_key = self.queue.base_key();

        for attempt in 1..=self.retry.attempts {
            let candidate = OsRng.gen_range(range.min()..=range.max());

            match self.queue.mark_used(candidate).await {
                Ok(true) => {
                    debug!(base_key = %base_key, id = candidate, attempt, "Allocated random id");
                    return Ok(candidate);
                }
                Ok(false) => {
                    warn!(base_key = %base_key, id = candidate, attempt, "Random id collision");
                }
                Err(e) if e.is_retryable() || e.kind == ErrorKind::ScriptMissing => {
                    warn!(
                        base_key = %base_key,
                        id = candidate,
                        attempt,
                        attempts = self.retry.attempts,
                        error = %e,
                        "Failed to mark random id as used"
                    );
                }
                Err(e) => return Err(e),
            }

            if self.retry.has_next(attempt) {
                self.sleeper.sleep(self.retry.backoff).await;
            }
        }

        warn!(base_key = %base_key, attempts = self.retry.attempts, "Room id pool exhausted");
        Err(AppError::pool_exhausted(format!(
            "failed to obtain a unique room id after {} random attempts (base_key: {base_key})",
            self.retry.attempts
        )))
    }

    /// Return a room id to the pool. See [`ReuseQueue::release`].
    pub async fn release_id(&self, id: i64) -> AppResult<()> {
        self.queue.release(id).await?;
        Ok(())
    }

    /// Number of room ids currently in use.
    pub async fn count_used_ids(&self) -> AppResult<u64> {
        self.queue.count_used().await
    }

    /// Number of room ids waiting for reuse.
    pub async fn count_released_ids(&self) -> AppResult<u64> {
        self.queue.count_released().await
    }

    /// Released room ids, next to be reused first.
    pub async fn released_ids(&self) -> AppResult<Vec<i64>> {
        self.queue.released_ids().await
    }

    /// Room ids currently in use, ascending.
    pub async fn used_ids(&self) -> AppResult<Vec<i64>> {
        self.queue.used_ids().await
    }

    /// Used and released counts of this pool.
    pub async fn stats(&self) -> AppResult<PoolStats> {
        self.queue.stats(None).await
    }

    /// Delete every key of this pool. Outstanding ids become unknown.
    pub async fn purge(&self) -> AppResult<()> {
        self.queue.purge(&[]).await?;
        Ok(())
    }
}
