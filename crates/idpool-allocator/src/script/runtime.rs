//! Per-instance script handle cache with one-shot recovery.
//!
//! Handles are owned by each allocator, never shared process-wide, so two
//! independently configured pools cannot overwrite each other's handles.
//! A missing or stale handle costs one extra round trip and nothing more.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use idpool_core::error::{AppError, ErrorKind};
use idpool_core::result::AppResult;
use idpool_core::traits::store::CoordinationStore;
use idpool_core::types::{AtomicScript, ScriptHandle, ScriptKind};

/// The scripts one allocator uses, with their cached handles.
#[derive(Debug)]
pub struct ScriptSet {
    /// Coordination store the scripts run on.
    store: Arc<dyn CoordinationStore>,
    /// Scripts registered together.
    scripts: Vec<AtomicScript>,
    /// Handles returned by the last registration.
    handles: RwLock<HashMap<ScriptKind, ScriptHandle>>,
}

impl ScriptSet {
    /// Create a set with no handles cached yet.
    pub fn new(store: Arc<dyn CoordinationStore>, scripts: &[AtomicScript]) -> Self {
        Self {
            store,
            scripts: scripts.to_vec(),
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// The store the scripts run on.
    pub fn store(&self) -> &Arc<dyn CoordinationStore> {
        &self.store
    }

    /// Register every script and cache the handles.
    pub async fn load_all(&self) -> AppResult<()> {
        let mut loaded = HashMap::with_capacity(self.scripts.len());
        for script in &self.scripts {
            let handle = self.store.load_script(script).await.map_err(|e| {
                AppError::with_source(
                    e.kind,
                    format!("failed to load {} script", script.kind),
                    e,
                )
            })?;
            loaded.insert(script.kind, handle);
        }
        *self.handles.write().await = loaded;
        Ok(())
    }

    /// Whether every script currently has a cached handle.
    pub async fn is_loaded(&self) -> bool {
        self.handles.read().await.len() == self.scripts.len()
    }

    /// Cached handle for `kind`, registering all scripts if any is missing.
    async fn handle_for(&self, kind: ScriptKind) -> AppResult<ScriptHandle> {
        {
            let handles = self.handles.read().await;
            if handles.len() == self.scripts.len() {
                if let Some(handle) = handles.get(&kind) {
                    return Ok(handle.clone());
                }
            }
        }

        self.load_all().await?;
        self.handles
            .read()
            .await
            .get(&kind)
            .cloned()
            .ok_or_else(|| AppError::internal(format!("{kind} script is not registered here")))
    }

    /// Execute `script` by handle, recovering once from a lost script cache.
    ///
    /// On a script-missing reply every script is registered again and the
    /// call is retried with the full body. A second failure is returned.
    pub async fn run(
        &self,
        script: &AtomicScript,
        keys: &[String],
        args: &[String],
    ) -> AppResult<Option<String>> {
        let handle = self.handle_for(script.kind).await?;

        match self.store.invoke_handle(&handle, script, keys, args).await {
            Err(e) if e.kind == ErrorKind::ScriptMissing => {
                warn!(script = %script.kind, handle = %handle, "Script handle unknown, reloading");
                self.load_all().await.map_err(|load_err| {
                    AppError::with_source(
                        load_err.kind,
                        format!("failed to reload scripts after {} was missing", script.kind),
                        load_err,
                    )
                })?;
                let reply = self.store.invoke_inline(script, keys, args).await?;
                info!(script = %script.kind, "Script recovered after reload");
                Ok(reply)
            }
            other => other,
        }
    }
}
