//! Allocation strategy for pools that support both reuse and fresh ids.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Decides whether released ids are consumed before fresh ones are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStrategy {
    /// Pop the oldest released id first; generate only when the queue is empty.
    #[default]
    PreferReleased,
    /// Always generate a fresh id. Released ids accumulate but are not consumed.
    PreferNew,
}

impl fmt::Display for GenerationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreferReleased => write!(f, "prefer_released"),
            Self::PreferNew => write!(f, "prefer_new"),
        }
    }
}
