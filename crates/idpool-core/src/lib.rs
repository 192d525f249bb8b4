//! # idpool-core
//!
//! Core crate for IdPool. Contains the coordination store capability,
//! configuration schemas, id range and strategy types, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other IdPool crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
