//! Redis coordination store.

pub mod store;

pub use store::RedisStore;
