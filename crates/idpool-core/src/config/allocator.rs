//! Allocator defaults applied by the pool factories.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::{GenerationStrategy, IdRange};

/// Default lower bound of a room id pool (6-digit ids).
pub const DEFAULT_MIN_ID: i64 = 100_000;
/// Default upper bound of a room id pool.
pub const DEFAULT_MAX_ID: i64 = 999_999;
/// Default cap of the released id queue.
pub const DEFAULT_MAX_RELEASED_IDS: i64 = 1000;
/// Default number of random candidates tried per allocation.
pub const DEFAULT_RANDOM_ATTEMPTS: u32 = 20;
/// Default wait between random candidates, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 10;

/// Random room id pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomIdConfig {
    /// Smallest id handed out.
    #[serde(default = "default_min_value")]
    pub min_value: i64,
    /// Largest id handed out.
    #[serde(default = "default_max_value")]
    pub max_value: i64,
    /// Maximum number of released ids kept for reuse.
    #[serde(default = "default_max_released_ids")]
    pub max_released_ids: i64,
    /// Random candidates tried before reporting exhaustion.
    #[serde(default = "default_random_attempts")]
    pub random_attempts: u32,
    /// Whether released ids are reused before generating new ones.
    #[serde(default)]
    pub strategy: GenerationStrategy,
    /// Wait between random candidates after a collision, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl RoomIdConfig {
    /// Validated id range.
    pub fn range(&self) -> Result<IdRange, AppError> {
        IdRange::new(self.min_value, self.max_value)
    }
}

impl Default for RoomIdConfig {
    fn default() -> Self {
        Self {
            min_value: default_min_value(),
            max_value: default_max_value(),
            max_released_ids: default_max_released_ids(),
            random_attempts: default_random_attempts(),
            strategy: GenerationStrategy::default(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Sequential id pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequentialIdConfig {
    /// Smallest id handed out.
    #[serde(default = "default_min_value")]
    pub min_value: i64,
    /// Largest id handed out.
    #[serde(default = "default_max_value")]
    pub max_value: i64,
    /// Maximum number of released ids kept for reuse.
    #[serde(default = "default_max_released_ids")]
    pub max_released_ids: i64,
}

impl SequentialIdConfig {
    /// Validated id range.
    pub fn range(&self) -> Result<IdRange, AppError> {
        IdRange::new(self.min_value, self.max_value)
    }
}

impl Default for SequentialIdConfig {
    fn default() -> Self {
        Self {
            min_value: default_min_value(),
            max_value: default_max_value(),
            max_released_ids: default_max_released_ids(),
        }
    }
}

/// Plain atomic counter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterConfig {
    /// First value returned by a fresh counter.
    #[serde(default = "default_initial_value")]
    pub initial_value: i64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            initial_value: default_initial_value(),
        }
    }
}

fn default_min_value() -> i64 {
    DEFAULT_MIN_ID
}

fn default_max_value() -> i64 {
    DEFAULT_MAX_ID
}

fn default_max_released_ids() -> i64 {
    DEFAULT_MAX_RELEASED_IDS
}

fn default_random_attempts() -> u32 {
    DEFAULT_RANDOM_ATTEMPTS
}

fn default_retry_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF_MS
}

fn default_initial_value() -> i64 {
    1
}
