//! Point-in-time view of one id pool, for operators and logs.

use serde::{Deserialize, Serialize};

use super::range::IdRange;
use crate::error::AppError;

/// Counts read from the store for one pool. Not a consistent snapshot:
/// each field is a separate read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Pool name.
    pub base_key: String,
    /// Ids the pool may hand out.
    pub range: IdRange,
    /// Ids currently in use.
    pub used: u64,
    /// Ids waiting for reuse.
    pub released: u64,
    /// Last counter value, for sequential pools that have allocated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<i64>,
}

impl PoolStats {
    /// Ids neither in use nor waiting in the queue, assuming no overlap.
    pub fn free(&self) -> u64 {
        self.range
            .len()
            .saturating_sub(self.used)
            .saturating_sub(self.released)
    }

    /// Render as a JSON document.
    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_and_json() {
        let stats = PoolStats {
            base_key: "lobby".to_string(),
            range: IdRange::new(1, 10).unwrap(),
            used: 4,
            released: 2,
            counter: None,
        };
        assert_eq!(stats.free(), 4);

        let json = stats.to_json().unwrap();
        assert!(!json.contains("counter"));
        let back: PoolStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
