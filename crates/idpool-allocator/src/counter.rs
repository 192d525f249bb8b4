//! Plain atomic counter backed by the coordination store.
//!
//! The counter key is created lazily by the first allocation. Every
//! allocation is one script call, so concurrent callers never see the same
//! value.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use idpool_core::error::AppError;
use idpool_core::result::AppResult;
use idpool_core::traits::generator::IdGenerator;
use idpool_core::traits::store::CoordinationStore;

use crate::script::ScriptSet;
use crate::script::lua::COUNTER_GET_OR_INIT;

/// Monotonic counter keyed by a single store key.
#[derive(Debug)]
pub struct AtomicCounterGenerator {
    /// Registered counter script.
    scripts: ScriptSet,
    /// Store key holding the last value handed out.
    counter_key: String,
    /// Value returned by the first allocation on a fresh key.
    initial_value: i64,
}

impl AtomicCounterGenerator {
    /// Create a counter and register its script with the store.
    pub async fn new(
        store: Arc<dyn CoordinationStore>,
        key: impl Into<String>,
        initial_value: i64,
    ) -> AppResult<Self> {
        let counter_key = key.into();
        if counter_key.is_empty() {
            return Err(AppError::configuration("counter key cannot be empty"));
        }
        if initial_value < 0 {
            return Err(AppError::configuration(format!(
                "initial value cannot be negative, got {initial_value}"
            )));
        }

        let scripts = ScriptSet::new(store, &[COUNTER_GET_OR_INIT]);
        scripts.load_all().await.map_err(|e| {
            AppError::with_source(
                e.kind,
                format!("failed to load counter script for key '{counter_key}'"),
                e,
            )
        })?;

        info!(key = %counter_key, initial_value, "Atomic counter initialized");
        Ok(Self {
            scripts,
            counter_key,
            initial_value,
        })
    }

    fn parse(&self, raw: &str) -> AppResult<i64> {
        raw.parse().map_err(|_| {
            error!(key = %self.counter_key, value = %raw, "Counter holds a non-integer value");
            AppError::corrupt_state(format!(
                "value '{raw}' for counter key '{}' is not an int64",
                self.counter_key
            ))
        })
    }
}

#[async_trait]
impl IdGenerator for AtomicCounterGenerator {
    async fn next_id(&self) -> AppResult<i64> {
        let reply = self
            .scripts
            .run(
                &COUNTER_GET_OR_INIT,
                &[self.counter_key.clone()],
                &[self.initial_value.to_string()],
            )
            .await?;

        let raw = reply.ok_or_else(|| {
            AppError::internal(format!(
                "counter script for key '{}' returned nil",
                self.counter_key
            ))
        })?;
        let id = self.parse(&raw)?;
        debug!(key = %self.counter_key, id, "Counter advanced");
        Ok(id)
    }

    async fn current_next_id(&self) -> AppResult<i64> {
        match self.scripts.store().get(&self.counter_key).await? {
            None => Ok(self.initial_value),
            Some(raw) => self.parse(&raw)?.checked_add(1).ok_or_else(|| {
                AppError::pool_exhausted(format!(
                    "counter key '{}' is at the int64 maximum",
                    self.counter_key
                ))
            }),
        }
    }
}
