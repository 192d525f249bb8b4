//! Used set and released queue shared by the pool allocators.

use tracing::{debug, error, warn};

use idpool_core::error::AppError;
use idpool_core::result::AppResult;
use idpool_core::types::{IdRange, PoolStats};

use crate::script::ScriptSet;
use crate::script::lua::{
    MODE_MARK_CANDIDATE, MODE_TAKE_RELEASED, RELEASE_AND_ENQUEUE, REUSE_TAKE_OR_MARK,
};

/// Store-side state of one pool: which ids are in use and which were
/// released recently.
#[derive(Debug)]
pub struct ReuseQueue {
    /// Scripts of the owning allocator.
    scripts: ScriptSet,
    /// Pool name used in logs and errors.
    base_key: String,
    /// Set of ids currently in use.
    used_key: String,
    /// List of released ids, oldest first.
    released_key: String,
    /// Ids this pool may hand out.
    range: IdRange,
    /// Cap of the released list.
    max_released_ids: i64,
}

impl ReuseQueue {
    /// Describe a pool. Performs no store round trip.
    pub fn new(
        scripts: ScriptSet,
        base_key: impl Into<String>,
        used_key: String,
        released_key: String,
        range: IdRange,
        max_released_ids: i64,
    ) -> Self {
        Self {
            scripts,
            base_key: base_key.into(),
            used_key,
            released_key,
            range,
            max_released_ids,
        }
    }

    /// Scripts of the owning allocator.
    pub fn scripts(&self) -> &ScriptSet {
        &self.scripts
    }

    /// Pool name.
    pub fn base_key(&self) -> &str {
        &self.base_key
    }

    /// Ids this pool may hand out.
    pub fn range(&self) -> IdRange {
        self.range
    }

    /// Cap of the released list.
    pub fn max_released_ids(&self) -> i64 {
        self.max_released_ids
    }

    /// Store key of the used set.
    pub fn used_key(&self) -> &str {
        &self.used_key
    }

    /// Store key of the released list.
    pub fn released_key(&self) -> &str {
        &self.released_key
    }

    /// Pop the oldest released id and mark it used in the same step.
    ///
    /// Returns `None` when the queue is empty.
    pub async fn take_released(&self) -> AppResult<Option<i64>> {
        let reply = self
            .scripts
            .run(
                &REUSE_TAKE_OR_MARK,
                &[self.released_key.clone(), self.used_key.clone()],
                &[String::new(), MODE_TAKE_RELEASED.to_string()],
            )
            .await
            .map_err(|e| {
                AppError::with_source(
                    e.kind,
                    format!("error taking id from released list (base_key: {})", self.base_key),
                    e,
                )
            })?;

        match reply.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => {
                let id = self.parse_id(raw)?;
                debug!(base_key = %self.base_key, id, "Reused released id");
                Ok(Some(id))
            }
        }
    }

    /// Insert `id` into the used set and drop it from the released list.
    /// Returns `false` if it was already used.
    pub async fn mark_used(&self, id: i64) -> AppResult<bool> {
        let reply = self
            .scripts
            .run(
                &REUSE_TAKE_OR_MARK,
                &[self.released_key.clone(), self.used_key.clone()],
                &[self.range.format(id), MODE_MARK_CANDIDATE.to_string()],
            )
            .await?;

        match reply.as_deref() {
            Some("1") => Ok(true),
            Some("0") => Ok(false),
            other => Err(AppError::internal(format!(
                "unexpected reply {other:?} marking id {id} (base_key: {})",
                self.base_key
            ))),
        }
    }

    /// Return `id` to the pool.
    ///
    /// Removes it from the used set, moves it to the tail of the released
    /// list and trims the list, all in one script. An id is queued at most
    /// once. Releasing an id that was not in
    /// use is tolerated. Returns whether the id was in use.
    pub async fn release(&self, id: i64) -> AppResult<bool> {
        if !self.range.contains(id) {
            return Err(AppError::validation(format!(
                "id {id} is out of valid range {}",
                self.range
            )));
        }

        let formatted = self.range.format(id);
        let reply = self
            .scripts
            .run(
                &RELEASE_AND_ENQUEUE,
                &[self.used_key.clone(), self.released_key.clone()],
                &[formatted.clone(), self.max_released_ids.to_string()],
            )
            .await
            .map_err(|e| {
                AppError::with_source(
                    e.kind,
                    format!(
                        "failed to release id {formatted} (base_key: {})",
                        self.base_key
                    ),
                    e,
                )
            })?;

        let removed = reply.as_deref() == Some("1");
        if removed {
            debug!(base_key = %self.base_key, id, "Released id");
        } else {
            warn!(base_key = %self.base_key, id, "Released id that was not in use");
        }
        Ok(removed)
    }

    /// Number of ids currently in use.
    pub async fn count_used(&self) -> AppResult<u64> {
        self.scripts.store().set_len(&self.used_key).await
    }

    /// Number of ids waiting in the released list.
    pub async fn count_released(&self) -> AppResult<u64> {
        self.scripts.store().list_len(&self.released_key).await
    }

    /// Released ids, oldest (next to be reused) first.
    pub async fn released_ids(&self) -> AppResult<Vec<i64>> {
        let items = self.scripts.store().list_items(&self.released_key).await?;
        items.iter().map(|raw| self.parse_id(raw)).collect()
    }

    /// Ids currently in use, ascending.
    pub async fn used_ids(&self) -> AppResult<Vec<i64>> {
        let members = self.scripts.store().set_members(&self.used_key).await?;
        let mut ids = members
            .iter()
            .map(|raw| self.parse_id(raw))
            .collect::<AppResult<Vec<_>>>()?;
        ids.sort_unstable();
        Ok(ids)
    }

    /// Current sizes of the used set and released list.
    pub async fn stats(&self, counter: Option<i64>) -> AppResult<PoolStats> {
        Ok(PoolStats {
            base_key: self.base_key.clone(),
            range: self.range,
            used: self.count_used().await?,
            released: self.count_released().await?,
            counter,
        })
    }

    /// Delete the used set, the released list and any `extra` pool keys.
    pub async fn purge(&self, extra: &[String]) -> AppResult<u64> {
        let mut keys = vec![self.used_key.clone(), self.released_key.clone()];
        keys.extend_from_slice(extra);
        let removed = self.scripts.store().delete(&keys).await?;
        warn!(base_key = %self.base_key, removed, "Purged pool keys");
        Ok(removed)
    }

    /// Parse an id read back from the store.
    pub fn parse_id(&self, raw: &str) -> AppResult<i64> {
        raw.parse().map_err(|_| {
            error!(base_key = %self.base_key, value = %raw, "Pool holds a non-integer id");
            AppError::corrupt_state(format!(
                "failed to parse id '{raw}' (base_key: {})",
                self.base_key
            ))
        })
    }
}
