//! # idpool
//!
//! Numeric identifier allocation backed by a shared coordination store.
//!
//! The crate wires the workspace members together: configuration is loaded
//! by `idpool-core`, the store backend is chosen by `idpool-store`, and the
//! allocators in `idpool-allocator` are built from the configured defaults.

pub mod bootstrap;
pub mod telemetry;

pub use bootstrap::IdPoolContext;
pub use idpool_allocator::{AtomicCounterGenerator, RoomIdManager, SequentialIdManager};
pub use idpool_core::config::AppConfig;
pub use idpool_core::traits::generator::IdGenerator;
pub use idpool_core::types::{GenerationStrategy, IdRange, PoolStats};
pub use idpool_core::{AppError, AppResult, ErrorKind};
