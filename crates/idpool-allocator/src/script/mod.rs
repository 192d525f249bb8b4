//! Atomic scripts executed at the coordination store.

pub mod lua;
pub mod runtime;

pub use runtime::ScriptSet;
