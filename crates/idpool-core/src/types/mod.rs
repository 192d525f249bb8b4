//! Core type definitions used across the IdPool workspace.

pub mod range;
pub mod script;
pub mod stats;
pub mod strategy;

pub use range::IdRange;
pub use script::{AtomicScript, EXHAUSTED_REPLY, ScriptHandle, ScriptKind};
pub use stats::PoolStats;
pub use strategy::GenerationStrategy;
