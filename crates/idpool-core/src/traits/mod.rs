//! Core traits defined in `idpool-core` and implemented by other crates.

pub mod generator;
pub mod store;

pub use generator::IdGenerator;
pub use store::CoordinationStore;
