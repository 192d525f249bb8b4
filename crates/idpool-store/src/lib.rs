//! # idpool-store
//!
//! Coordination store backends for IdPool. Supports two modes:
//!
//! - **memory**: in-process store that runs every atomic script under one
//!   mutex (single node, tests)
//! - **redis**: Redis-backed store executing Lua scripts via the
//!   [redis](https://crates.io/crates/redis) crate
//!
//! The backend is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::StoreManager;
