//! In-memory coordination store.

pub mod store;

pub use store::MemoryStore;
