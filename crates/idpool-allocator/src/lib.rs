//! # idpool-allocator
//!
//! Numeric id allocators backed by a shared coordination store.
//!
//! ## Modules
//!
//! - `counter`: plain atomic counter with lazy initialisation
//! - `pool`: bounded-range pools with reuse: random room ids and
//!   sequential ids
//! - `script`: Lua script definitions and per-instance handle caching
//! - `retry`: backoff policy for the random collision loop

pub mod counter;
pub mod pool;
pub mod retry;
pub mod script;

pub use counter::AtomicCounterGenerator;
pub use pool::{RoomIdManager, SequentialIdManager};
pub use retry::{Sleeper, TokioSleeper};
