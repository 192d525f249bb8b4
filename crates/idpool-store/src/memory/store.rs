//! In-memory coordination store.
//!
//! Each atomic script is emulated natively and executed while holding a
//! single Tokio mutex, which gives the same all-or-nothing behaviour as a
//! Lua script on a Redis server. Suitable for single-node deployments and
//! tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use idpool_core::error::AppError;
use idpool_core::result::AppResult;
use idpool_core::traits::store::CoordinationStore;
use idpool_core::types::{AtomicScript, EXHAUSTED_REPLY, ScriptHandle, ScriptKind};

/// Data held by the store.
#[derive(Debug, Default)]
struct InnerState {
    /// Plain string values (counters).
    strings: HashMap<String, String>,
    /// Sets of used ids.
    sets: HashMap<String, HashSet<String>>,
    /// Queues of released ids, head at the front.
    lists: HashMap<String, VecDeque<String>>,
    /// Registered scripts by handle.
    scripts: HashMap<String, ScriptKind>,
    /// Bumped on every script cache flush so stale handles stay unknown.
    generation: u64,
}

/// In-memory coordination store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Protected inner state.
    state: Arc<Mutex<InnerState>>,
    /// When set, every call fails as if the store were unreachable.
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every registered script, as a Redis restart would.
    pub async fn flush_scripts(&self) {
        let mut state = self.state.lock().await;
        state.scripts.clear();
        state.generation += 1;
        info!(generation = state.generation, "Script cache flushed");
    }

    /// Overwrite a plain value, bypassing the scripts.
    pub async fn set_raw(&self, key: &str, value: &str) {
        let mut state = self.state.lock().await;
        state.strings.insert(key.to_string(), value.to_string());
    }

    /// Make every subsequent call fail with a transient store error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::transient_store("memory store is unavailable"));
        }
        Ok(())
    }
}

impl InnerState {
    /// Pop the head of the released queue and mark it used.
    fn take_released(&mut self, released_key: &str, used_key: &str) -> Option<String> {
        let id = self.lists.get_mut(released_key)?.pop_front()?;
        self.sets
            .entry(used_key.to_string())
            .or_default()
            .insert(id.clone());
        Some(id)
    }

    /// Drop every queued copy of `id`.
    fn unqueue(&mut self, released_key: &str, id: &str) {
        if let Some(queue) = self.lists.get_mut(released_key) {
            queue.retain(|queued| queued != id);
        }
    }

    fn execute(
        &mut self,
        kind: ScriptKind,
        keys: &[String],
        args: &[String],
    ) -> AppResult<Option<String>> {
        match kind {
            ScriptKind::CounterGetOrInit => {
                let counter_key = key_at(keys, 0)?;
                let initial = int_arg(args, 0)?;
                let next = match self.strings.get(counter_key) {
                    None => initial,
                    Some(raw) => parse_stored(counter_key, raw)?
                        .checked_add(1)
                        .ok_or_else(|| {
                            AppError::pool_exhausted(format!(
                                "counter at key '{counter_key}' would overflow"
                            ))
                        })?,
                };
                self.strings.insert(counter_key.to_string(), next.to_string());
                Ok(Some(next.to_string()))
            }
            ScriptKind::ReuseTakeOrMark => {
                let released_key = key_at(keys, 0)?;
                let used_key = key_at(keys, 1)?;
                let candidate = str_arg(args, 0)?;
                match str_arg(args, 1)? {
                    "take_released" => Ok(self.take_released(released_key, used_key)),
                    "mark_candidate" => {
                        let added = self
                            .sets
                            .entry(used_key.to_string())
                            .or_default()
                            .insert(candidate.to_string());
                        if added {
                            self.unqueue(released_key, candidate);
                        }
                        Ok(Some(if added { "1" } else { "0" }.to_string()))
                    }
                    other => Err(AppError::internal(format!("Unknown mode: {other}"))),
                }
            }
            ScriptKind::ReleaseAndEnqueue => {
                let used_key = key_at(keys, 0)?;
                let released_key = key_at(keys, 1)?;
                let id = str_arg(args, 0)?;
                let max_len = int_arg(args, 1)?;
                let removed = self
                    .sets
                    .get_mut(used_key)
                    .is_some_and(|set| set.remove(id));
                self.unqueue(released_key, id);
                let queue = self.lists.entry(released_key.to_string()).or_default();
                queue.push_back(id.to_string());
                let cap = usize::try_from(max_len.max(1)).unwrap_or(usize::MAX);
                while queue.len() > cap {
                    queue.pop_front();
                }
                Ok(Some(if removed { "1" } else { "0" }.to_string()))
            }
            ScriptKind::SequentialGet => {
                let released_key = key_at(keys, 0)?;
                let used_key = key_at(keys, 1)?;
                let counter_key = key_at(keys, 2)?;
                let seed = str_arg(args, 0)?;
                let max = int_arg(args, 1)?;
                let width = usize::try_from(int_arg(args, 2)?).unwrap_or(0);

                if let Some(id) = self.take_released(released_key, used_key) {
                    return Ok(Some(id));
                }

                let current = match self.strings.get(counter_key) {
                    None => parse_stored(counter_key, seed)?,
                    Some(raw) => parse_stored(counter_key, raw)?,
                };
                let next = match current.checked_add(1) {
                    Some(next) if next <= max => next,
                    _ => {
                        self.strings.insert(counter_key.to_string(), max.to_string());
                        return Ok(Some(EXHAUSTED_REPLY.to_string()));
                    }
                };
                self.strings.insert(counter_key.to_string(), next.to_string());
                let id = format!("{next:0width$}");
                self.sets
                    .entry(used_key.to_string())
                    .or_default()
                    .insert(id.clone());
                Ok(Some(id))
            }
        }
    }
}

fn key_at(keys: &[String], index: usize) -> AppResult<&str> {
    keys.get(index)
        .map(String::as_str)
        .ok_or_else(|| AppError::internal(format!("missing KEYS[{}]", index + 1)))
}

fn str_arg(args: &[String], index: usize) -> AppResult<&str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| AppError::internal(format!("missing ARGV[{}]", index + 1)))
}

fn int_arg(args: &[String], index: usize) -> AppResult<i64> {
    let raw = str_arg(args, index)?;
    raw.parse().map_err(|_| {
        AppError::internal(format!("ARGV[{}] ('{raw}') is not a number", index + 1))
    })
}

fn parse_stored(key: &str, raw: &str) -> AppResult<i64> {
    raw.parse().map_err(|_| {
        AppError::corrupt_state(format!("value '{raw}' at key '{key}' is not an integer"))
    })
}

#[async_trait]
impl CoordinationStore for MemoryStore {
    async fn load_script(&self, script: &AtomicScript) -> AppResult<ScriptHandle> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let handle = format!("mem:{}:{}", script.kind.name(), state.generation);
        state.scripts.insert(handle.clone(), script.kind);
        debug!(script = %script.kind, handle = %handle, "Registered script");
        Ok(ScriptHandle::new(handle))
    }

    async fn invoke_handle(
        &self,
        handle: &ScriptHandle,
        script: &AtomicScript,
        keys: &[String],
        args: &[String],
    ) -> AppResult<Option<String>> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let registered = state.scripts.get(handle.as_str()).copied();
        match registered {
            None => Err(AppError::script_missing(format!(
                "NOSCRIPT No matching script for handle {handle}"
            ))),
            Some(kind) if kind != script.kind => Err(AppError::internal(format!(
                "handle {handle} is registered for {kind}, not {}",
                script.kind
            ))),
            Some(_) => state.execute(script.kind, keys, args),
        }
    }

    async fn invoke_inline(
        &self,
        script: &AtomicScript,
        keys: &[String],
        args: &[String],
    ) -> AppResult<Option<String>> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        state.execute(script.kind, keys, args)
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.strings.get(key).cloned())
    }

    async fn set_len(&self, key: &str) -> AppResult<u64> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.sets.get(key).map_or(0, |s| s.len() as u64))
    }

    async fn set_members(&self, key: &str) -> AppResult<Vec<String>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .sets
            .get(key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_len(&self, key: &str) -> AppResult<u64> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.lists.get(key).map_or(0, |l| l.len() as u64))
    }

    async fn list_items(&self, key: &str) -> AppResult<Vec<String>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .lists
            .get(key)
            .map(|l| l.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, keys: &[String]) -> AppResult<u64> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let mut removed = 0u64;
        for key in keys {
            let existed = state.strings.remove(key).is_some()
                | state.sets.remove(key).is_some()
                | state.lists.remove(key).is_some();
            if existed {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }
}
