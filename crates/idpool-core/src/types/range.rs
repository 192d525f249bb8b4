//! Inclusive numeric id ranges and their canonical string form.
//!
//! Ids are stored as zero-padded decimal strings whose width is the digit
//! count of the range maximum, so lexical and numeric order agree inside
//! the store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// An inclusive `[min, max]` range of non-negative ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdRange {
    min: i64,
    max: i64,
}

impl IdRange {
    /// Largest id a range may hold: 2^53 - 1, the biggest integer a Lua
    /// number represents exactly.
    pub const MAX_ID: i64 = (1 << 53) - 1;

    /// Create a range, rejecting negative bounds, `min > max` and maxima
    /// above [`IdRange::MAX_ID`].
    pub fn new(min: i64, max: i64) -> Result<Self, AppError> {
        if min < 0 {
            return Err(AppError::configuration(format!(
                "range minimum must be non-negative, got {min}"
            )));
        }
        if min > max {
            return Err(AppError::configuration(format!(
                "range minimum {min} exceeds maximum {max}"
            )));
        }
        if max > Self::MAX_ID {
            return Err(AppError::configuration(format!(
                "range maximum {max} exceeds the largest supported id {}",
                Self::MAX_ID
            )));
        }
        Ok(Self { min, max })
    }

    /// Smallest id in the range.
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Largest id in the range.
    pub fn max(&self) -> i64 {
        self.max
    }

    /// Number of ids in the range.
    pub fn len(&self) -> u64 {
        (self.max - self.min) as u64 + 1
    }

    /// Always `false`; a valid range holds at least one id.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `id` lies inside the range.
    pub fn contains(&self, id: i64) -> bool {
        id >= self.min && id <= self.max
    }

    /// Digit count of the range maximum.
    pub fn width(&self) -> usize {
        let mut width = 1;
        let mut rest = self.max / 10;
        while rest > 0 {
            width += 1;
            rest /= 10;
        }
        width
    }

    /// Canonical fixed-width form of `id`.
    pub fn format(&self, id: i64) -> String {
        format!("{id:0width$}", width = self.width())
    }
}

impl fmt::Display for IdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_room_range_is_six_digits() {
        let range = IdRange::new(100_000, 999_999).unwrap();
        assert_eq!(range.width(), 6);
        assert_eq!(range.len(), 900_000);
        assert_eq!(range.format(123_456), "123456");
    }

    #[test]
    fn test_format_pads_small_ids() {
        let range = IdRange::new(1, 999_999).unwrap();
        assert_eq!(range.format(42), "000042");
        assert!("000042" < "000100");
    }

    #[test]
    fn test_single_id_range() {
        let range = IdRange::new(0, 0).unwrap();
        assert_eq!(range.width(), 1);
        assert_eq!(range.len(), 1);
        assert!(range.contains(0));
        assert!(!range.contains(1));
    }

    #[test]
    fn test_invalid_ranges() {
        assert_eq!(IdRange::new(-1, 10).unwrap_err().kind, ErrorKind::Configuration);
        assert_eq!(IdRange::new(10, 9).unwrap_err().kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_maximum_is_bounded() {
        let top = IdRange::new(0, IdRange::MAX_ID).unwrap();
        assert_eq!(top.width(), 16);
        assert_eq!(
            IdRange::new(0, IdRange::MAX_ID + 1).unwrap_err().kind,
            ErrorKind::Configuration
        );
        assert_eq!(
            IdRange::new(i64::MAX - 1, i64::MAX).unwrap_err().kind,
            ErrorKind::Configuration
        );
    }
}
